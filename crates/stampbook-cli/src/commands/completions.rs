//! Shell completions generation and installation.

use std::io;
use std::path::PathBuf;
use std::{env, fs};

use anyhow::{bail, Context, Result};
use clap::CommandFactory;
use clap_complete::{generate, Shell};

use super::{Cli, CompletionsAction, ShellType};

const BIN_NAME: &str = "stampbook";

impl From<ShellType> for Shell {
    fn from(shell: ShellType) -> Self {
        match shell {
            ShellType::Bash => Self::Bash,
            ShellType::Zsh => Self::Zsh,
            ShellType::Fish => Self::Fish,
            ShellType::PowerShell => Self::PowerShell,
            ShellType::Elvish => Self::Elvish,
        }
    }
}

/// Run the completions command.
pub fn run(action: CompletionsAction) -> Result<()> {
    match action {
        CompletionsAction::Generate { shell } => {
            generate(
                Shell::from(shell),
                &mut Cli::command(),
                BIN_NAME,
                &mut io::stdout(),
            );
            Ok(())
        }
        CompletionsAction::Install { shell } => {
            let shell = shell.map_or_else(detect_shell, Ok)?;
            let path = completions_path(shell)?;

            let mut script = Vec::new();
            generate(Shell::from(shell), &mut Cli::command(), BIN_NAME, &mut script);

            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            fs::write(&path, script)
                .with_context(|| format!("Failed to write completions to: {}", path.display()))?;

            println!("✓ Installed {shell:?} completions to: {}", path.display());
            println!("  Restart your shell to pick them up.");
            if matches!(shell, ShellType::Zsh) {
                println!("  Make sure ~/.local/share/zsh/site-functions is on your fpath.");
            }
            Ok(())
        }
        CompletionsAction::Uninstall { shell } => {
            let shell = shell.map_or_else(detect_shell, Ok)?;
            let path = completions_path(shell)?;
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove: {}", path.display()))?;
                println!("✓ Removed {shell:?} completions from: {}", path.display());
            } else {
                println!("No completions file found at: {}", path.display());
            }
            Ok(())
        }
    }
}

/// Detect the user's shell from `$SHELL`.
fn detect_shell() -> Result<ShellType> {
    let shell_path = env::var("SHELL").context(
        "Could not detect shell from $SHELL environment variable.\n\
         Use --shell to specify your shell manually.",
    )?;
    shell_from_path(&shell_path)
}

fn shell_from_path(shell_path: &str) -> Result<ShellType> {
    let name = shell_path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(shell_path)
        .trim_end_matches(".exe")
        .to_lowercase();

    Ok(match name.as_str() {
        "bash" => ShellType::Bash,
        "zsh" => ShellType::Zsh,
        "fish" => ShellType::Fish,
        "pwsh" | "powershell" => ShellType::PowerShell,
        "elvish" => ShellType::Elvish,
        other => bail!(
            "Unknown shell: {other}\n\
             Supported shells: bash, zsh, fish, powershell, elvish"
        ),
    })
}

/// `$var` if set, else `$HOME/fallback`.
fn xdg_dir(var: &str, fallback: &str) -> Result<PathBuf> {
    if let Some(dir) = env::var_os(var).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(fallback))
}

fn completions_path(shell: ShellType) -> Result<PathBuf> {
    Ok(match shell {
        ShellType::Bash => xdg_dir("XDG_DATA_HOME", ".local/share")?
            .join("bash-completion/completions")
            .join(BIN_NAME),
        ShellType::Zsh => xdg_dir("XDG_DATA_HOME", ".local/share")?
            .join("zsh/site-functions")
            .join(format!("_{BIN_NAME}")),
        ShellType::Fish => xdg_dir("XDG_CONFIG_HOME", ".config")?
            .join("fish/completions")
            .join(format!("{BIN_NAME}.fish")),
        ShellType::PowerShell => xdg_dir("XDG_CONFIG_HOME", ".config")?
            .join("powershell/Microsoft.PowerShell_profile.d")
            .join(format!("{BIN_NAME}.ps1")),
        ShellType::Elvish => xdg_dir("XDG_CONFIG_HOME", ".config")?
            .join("elvish/lib")
            .join(format!("{BIN_NAME}.elv")),
    })
}

//! Config command implementation.

use anyhow::{Context, Result};

use stampbook_core::config::Config;

use super::{ConfigAction, ConfigArgs};

/// Run the config command.
pub fn run(args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let config = Config::load().context("Failed to load configuration")?;
            let rendered =
                toml::to_string_pretty(&config).context("Failed to render configuration")?;
            println!("# {}", Config::config_path().display());
            println!("{rendered}");
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path().display());
        }
        ConfigAction::Reset => {
            Config::default()
                .save()
                .context("Failed to write default configuration")?;
            println!("✓ Configuration reset: {}", Config::config_path().display());
        }
    }
    Ok(())
}


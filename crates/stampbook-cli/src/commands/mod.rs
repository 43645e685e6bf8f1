//! CLI command definitions and handlers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use stampbook_core::config::Config;
use stampbook_core::lookup::Resolver;
use stampbook_core::session::SessionFile;
use stampbook_core::store::JsonStore;
use stampbook_core::verify::EnrollmentVerifier;

/// Load configuration with graceful fallback to defaults.
///
/// This function should be used by all commands to load the user's configuration.
/// If the config file doesn't exist or can't be parsed, it falls back to defaults.
pub fn load_config() -> Config {
    Config::load().unwrap_or_default()
}

/// Open the store named by `--store`, or the configured one.
pub fn open_store(config: &Config, store_override: Option<PathBuf>) -> Result<JsonStore> {
    let path = store_override.unwrap_or_else(|| config.store.resolved_path());
    tracing::debug!(path = %path.display(), "opening customer store");
    JsonStore::load_from(&path)
        .with_context(|| format!("Failed to open customer store at {}", path.display()))
}

/// Resolver over `store`, with the index cache if enabled.
pub fn build_resolver(config: &Config, store: Arc<JsonStore>) -> Resolver {
    let resolver = Resolver::new(store);
    if config.lookup.cache {
        resolver.with_cache(config.lookup.cache_threshold)
    } else {
        resolver
    }
}

/// Verifier over `store` configured from `config`.
pub fn build_verifier(config: &Config, store: Arc<JsonStore>) -> EnrollmentVerifier {
    EnrollmentVerifier::with_resolver(build_resolver(config, store.clone()), store)
        .with_placeholder_name(config.display.placeholder_name.clone())
        .with_timeout(config.lookup.timeout)
}

/// Business to act for: the explicit flag, else the saved session.
pub fn business_or_session(business: Option<String>) -> Result<String> {
    if let Some(business) = business {
        return Ok(business);
    }
    let session = SessionFile::default_location().load()?;
    Ok(session.business_id)
}

pub mod check;
pub mod code;
pub mod completions;
pub mod config;
pub mod customer;
pub mod enroll;
pub mod normalize;
pub mod resolve;
pub mod serve;
pub mod session;
pub mod verify;

/// Stampbook - Loyalty customer codes
#[derive(Parser)]
#[command(name = "stampbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Show debug output from the lookup pipeline
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Customer store file (overrides config)
    #[arg(long, global = true, env = "STAMPBOOK_STORE")]
    pub store: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand)]
pub enum Command {
    /// Show the code for a customer identifier
    Code(CodeArgs),

    /// Normalize typed input into code form
    Normalize(NormalizeArgs),

    /// Find the customer behind a code
    Resolve(ResolveArgs),

    /// Check that a code belongs to a customer enrolled at a business
    Verify(VerifyArgs),

    /// Run generator consistency checks
    Check(CheckArgs),

    /// Manage customers in the store
    Customer(CustomerArgs),

    /// Enroll a customer at a business
    Enroll(EnrollArgs),

    /// Manage the operator session
    Session(SessionArgs),

    /// Serve the JSON API
    Serve(ServeArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the code command
#[derive(Parser)]
pub struct CodeArgs {
    /// Customer identifier
    pub id: String,

    /// Show a QR code with the deep link
    #[arg(long)]
    pub qr: bool,

    /// Show each generation step
    #[arg(long)]
    pub trace: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the normalize command
#[derive(Parser)]
pub struct NormalizeArgs {
    /// Text as typed by the operator
    pub input: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the resolve command
#[derive(Parser)]
pub struct ResolveArgs {
    /// Customer code, any case, hyphens optional
    pub code: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the verify command
#[derive(Parser)]
pub struct VerifyArgs {
    /// Customer code, any case, hyphens optional
    pub code: String,

    /// Business identifier (defaults to the session's business)
    #[arg(short, long)]
    pub business: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the check command
#[derive(Parser)]
pub struct CheckArgs {
    /// Identifiers to round-trip (defaults to every customer in the store)
    pub ids: Vec<String>,

    /// Print the generation trail for one identifier
    #[arg(long, value_name = "ID")]
    pub trace: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the customer command
#[derive(Parser)]
pub struct CustomerArgs {
    /// Customer subcommand
    #[command(subcommand)]
    pub action: CustomerAction,
}

/// Customer subcommands
#[derive(Subcommand)]
pub enum CustomerAction {
    /// Add a customer
    Add {
        /// Identifier (a new UUID if omitted)
        #[arg(long)]
        id: Option<String>,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Account role
        #[arg(long, value_enum, default_value_t = RoleArg::Customer)]
        role: RoleArg,
    },

    /// List customers with their codes
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Remove a customer and their enrollments
    Remove {
        /// Customer identifier
        id: String,
    },
}

/// Account roles accepted on the command line
#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum RoleArg {
    /// Collects points
    Customer,
    /// Runs a loyalty program
    Business,
    /// Administers the service
    Admin,
}

impl From<RoleArg> for stampbook_core::directory::Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Customer => Self::Customer,
            RoleArg::Business => Self::Business,
            RoleArg::Admin => Self::Admin,
        }
    }
}

/// Arguments for the enroll command
#[derive(Parser)]
pub struct EnrollArgs {
    /// Customer identifier
    pub customer_id: String,

    /// Business identifier (defaults to the session's business)
    #[arg(short, long)]
    pub business: Option<String>,

    /// Remove the enrollment instead
    #[arg(long)]
    pub remove: bool,
}

/// Arguments for the session command
#[derive(Parser)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub action: SessionAction,
}

/// Session subcommands
#[derive(Subcommand)]
pub enum SessionAction {
    /// Start acting for a business
    Login {
        /// Business identifier
        #[arg(short, long)]
        business: String,

        /// Operator label (staff name, till number)
        #[arg(short, long)]
        operator: Option<String>,
    },

    /// End the session
    Logout,

    /// Show the current session
    Show {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Arguments for the serve command
#[derive(Parser)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Listen on all interfaces instead of localhost
    #[arg(long)]
    pub public: bool,
}

/// Arguments for the config command
#[derive(Parser)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Reset configuration to defaults
    Reset,
}

/// Arguments for the completions command
#[derive(Parser)]
pub struct CompletionsArgs {
    /// Completions subcommand
    #[command(subcommand)]
    pub action: CompletionsAction,
}

/// Completions subcommands
#[derive(Subcommand, Clone, Copy)]
pub enum CompletionsAction {
    /// Install shell completions (auto-detects shell)
    Install {
        /// Override shell detection
        #[arg(long, value_enum)]
        shell: Option<ShellType>,
    },

    /// Uninstall shell completions
    Uninstall {
        /// Override shell detection
        #[arg(long, value_enum)]
        shell: Option<ShellType>,
    },

    /// Generate completions and print to stdout (for manual installation)
    Generate {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: ShellType,
    },
}

/// Supported shell types for completions
#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell
    Elvish,
}

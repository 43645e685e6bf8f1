//! Stampbook CLI - Loyalty customer codes
//!
//! Every customer gets a short code (`SUN-873-VPV`) derived from their
//! identifier. Businesses type or scan it to find the customer and check
//! that they joined the loyalty program.
//!
//! ## Quick Start
//!
//! ```bash
//! # Show a customer's code
//! stampbook code 11111111-1111-1111-1111-111111111111 --qr
//!
//! # Act for a business and check a code read out at the counter
//! stampbook session login --business biz-42
//! stampbook verify sun873vpv
//! ```

#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

use std::process::ExitCode;

use clap::Parser;

mod commands;
pub mod ui;

use commands::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = cli.store;
    let result = match cli.command {
        Command::Code(args) => commands::code::run(args),
        Command::Normalize(args) => commands::normalize::run(&args),
        Command::Resolve(args) => commands::resolve::run(args, store).await,
        Command::Verify(args) => commands::verify::run(args, store).await,
        Command::Check(args) => commands::check::run(args, store),
        Command::Customer(args) => commands::customer::run(args, store),
        Command::Enroll(args) => commands::enroll::run(args, store),
        Command::Session(args) => commands::session::run(args),
        Command::Serve(args) => commands::serve::run(args, store).await,
        Command::Config(args) => commands::config::run(args),
        Command::Completions(args) => commands::completions::run(args.action),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::print_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose {
        "warn,stampbook=debug,stampbook_core=debug"
    } else {
        "warn,stampbook=info,stampbook_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

//! Serve command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use stampbook_core::qr::QrConfig;
use stampbook_core::web::{self, AppState};

use super::ServeArgs;

/// Run the serve command.
pub async fn run(args: ServeArgs, store: Option<PathBuf>) -> Result<()> {
    let config = super::load_config();
    let mut web_config = config.web.clone();
    if let Some(port) = args.port {
        web_config.port = port;
    }
    if args.public {
        web_config.localhost_only = false;
    }

    let store = Arc::new(super::open_store(&config, store)?);
    let customers = store.profiles().len();
    let state = AppState::new(super::build_verifier(&config, store))
        .with_qr_config(QrConfig::from(&config.qr));

    println!();
    println!("  Stampbook API on http://{}", web::bind_address(&web_config));
    println!("  {customers} profiles loaded. Press Ctrl+C to stop.");
    println!();

    web::serve(state, &web_config)
        .await
        .context("Web API stopped with an error")
}

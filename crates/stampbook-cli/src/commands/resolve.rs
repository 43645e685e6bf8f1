//! Resolve command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use stampbook_core::lookup::LookupOutcome;
use stampbook_core::Error;

use super::ResolveArgs;

/// Run the resolve command.
pub async fn run(args: ResolveArgs, store: Option<PathBuf>) -> Result<()> {
    let config = super::load_config();
    let store = Arc::new(super::open_store(&config, store)?);
    let resolver = super::build_resolver(&config, store.clone());

    let outcome = resolver.resolve(&args.code).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        LookupOutcome::Found(id) => {
            let name = store
                .find_profile(&id)
                .and_then(|p| p.name.as_deref())
                .unwrap_or("-");
            println!("{id}  {name}");
            Ok(())
        }
        LookupOutcome::NotFound => Err(Error::CodeNotFound(args.code).into()),
        LookupOutcome::Malformed => Err(Error::InvalidCodeFormat(args.code).into()),
    }
}

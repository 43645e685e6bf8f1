//! Verify command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use stampbook_core::verify::VerifyOutcome;

use super::VerifyArgs;

/// Run the verify command.
pub async fn run(args: VerifyArgs, store: Option<PathBuf>) -> Result<()> {
    let business_id = super::business_or_session(args.business)?;
    let config = super::load_config();
    let store = Arc::new(super::open_store(&config, store)?);
    let verifier = super::build_verifier(&config, store);

    let outcome = verifier
        .find_enrolled_customer(&args.code, &business_id)
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        VerifyOutcome::Found(customer) => {
            println!();
            println!("  ✓ {}", customer.display_name);
            println!("    Customer: {}", customer.customer_id);
            println!("    Points:   {}", customer.points);
            println!();
            Ok(())
        }
        VerifyOutcome::NotFound(reason) => {
            println!();
            println!("  ✗ {}", reason.message());
            println!();
            Err(reason.into_error(&args.code, &business_id).into())
        }
    }
}

//! Enroll command implementation.

use std::path::PathBuf;

use anyhow::Result;

use super::EnrollArgs;

/// Run the enroll command.
pub fn run(args: EnrollArgs, store: Option<PathBuf>) -> Result<()> {
    let business_id = super::business_or_session(args.business)?;
    let config = super::load_config();
    let mut store = super::open_store(&config, store)?;

    if args.remove {
        if store.unenroll(&args.customer_id, &business_id)? {
            println!("✓ Removed {} from {business_id}", args.customer_id);
        } else {
            println!("{} was not enrolled at {business_id}", args.customer_id);
        }
        return Ok(());
    }

    let enrollment = store.enroll(&args.customer_id, &business_id)?;
    println!(
        "✓ {} enrolled at {} since {}",
        enrollment.customer_id,
        enrollment.business_id,
        enrollment.joined_at.format("%Y-%m-%d")
    );
    Ok(())
}

//! Customer command implementation.

use std::path::PathBuf;

use anyhow::Result;

use stampbook_core::code::customer_code;
use stampbook_core::directory::CustomerProfile;

use super::{CustomerAction, CustomerArgs};

/// Run the customer command.
pub fn run(args: CustomerArgs, store: Option<PathBuf>) -> Result<()> {
    let config = super::load_config();
    let mut store = super::open_store(&config, store)?;

    match args.action {
        CustomerAction::Add { id, name, role } => {
            let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let profile = CustomerProfile::customer(id, name).with_role(role.into());
            store.add_profile(profile.clone())?;
            println!("✓ Added {} {}", profile.role, profile.id);
            println!("  Code: {}", customer_code(Some(&profile.id)));
        }
        CustomerAction::List { json } => {
            if json {
                let output: Vec<_> = store
                    .profiles()
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "id": p.id,
                            "name": p.name,
                            "role": p.role,
                            "code": customer_code(Some(&p.id)),
                            "enrollments": store
                                .enrollments_for(&p.id)
                                .iter()
                                .map(|e| e.business_id.as_str())
                                .collect::<Vec<_>>(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if store.profiles().is_empty() {
                println!("No customers in {}", store.path().display());
            } else {
                println!("{:<13}  {:<38}  {:<9}  Name", "Code", "ID", "Role");
                println!("{}", "─".repeat(80));
                for p in store.profiles() {
                    println!(
                        "{:<13}  {:<38}  {:<9}  {}",
                        customer_code(Some(&p.id)),
                        p.id,
                        p.role.to_string(),
                        p.name.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        CustomerAction::Remove { id } => {
            if store.remove_profile(&id)? {
                println!("✓ Removed {id}");
            } else {
                return Err(stampbook_core::Error::UnknownCustomer(id).into());
            }
        }
    }

    Ok(())
}

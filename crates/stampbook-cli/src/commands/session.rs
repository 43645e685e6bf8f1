//! Session command implementation.

use anyhow::Result;

use stampbook_core::session::{Session, SessionFile};

use super::{SessionAction, SessionArgs};

/// Run the session command.
pub fn run(args: SessionArgs) -> Result<()> {
    let file = SessionFile::default_location();

    match args.action {
        SessionAction::Login { business, operator } => {
            let mut session = Session::new(business);
            if let Some(operator) = operator {
                session = session.with_operator(operator);
            }
            file.save(&session)?;
            println!("✓ Acting for business {}", session.business_id);
        }
        SessionAction::Logout => {
            if file.clear()? {
                println!("✓ Session ended");
            } else {
                println!("No active session");
            }
        }
        SessionAction::Show { json } => {
            let session = file.load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&session)?);
            } else {
                let started = session.started_at.with_timezone(&chrono::Local);
                println!("Business: {}", session.business_id);
                if let Some(operator) = &session.operator {
                    println!("Operator: {operator}");
                }
                println!("Since:    {}", started.format("%Y-%m-%d %H:%M"));
            }
        }
    }

    Ok(())
}

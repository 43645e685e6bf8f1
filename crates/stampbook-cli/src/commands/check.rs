//! Check command implementation.

use std::path::PathBuf;

use anyhow::{bail, Result};

use stampbook_core::diagnostics::{check_consistency, find_collisions, DiagnosticTrail};
use stampbook_core::directory::{DirectoryEntry, Role};

use super::CheckArgs;

/// Run the check command.
pub fn run(args: CheckArgs, store: Option<PathBuf>) -> Result<()> {
    if let Some(id) = &args.trace {
        let trail = DiagnosticTrail::capture(id)?;
        println!("{}", trail.render());
        return Ok(());
    }

    let entries: Vec<DirectoryEntry> = if args.ids.is_empty() {
        let config = super::load_config();
        super::open_store(&config, store)?
            .profiles()
            .iter()
            .filter(|p| p.role == Role::Customer)
            .map(DirectoryEntry::from)
            .collect()
    } else {
        args.ids
            .iter()
            .map(|id| DirectoryEntry {
                id: id.clone(),
                name: None,
            })
            .collect()
    };

    let report = check_consistency(entries.iter().map(|e| e.id.as_str()));
    let collisions = find_collisions(&entries);

    if args.json {
        let output = serde_json::json!({
            "passed": report.passed(),
            "report": report,
            "collisions": collisions,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!();
        println!("  Identifiers checked: {}", report.checked);
        println!("  Golden vectors:      {}", status(report.golden_mismatches.is_empty()));
        println!("  Round trips:         {}", status(report.mismatches.is_empty()));

        for mismatch in &report.golden_mismatches {
            println!(
                "    golden {:?}: expected {}, got {}",
                mismatch.id, mismatch.expected, mismatch.actual
            );
        }
        for round_trip in &report.mismatches {
            println!(
                "    {:?}: {} then {}",
                round_trip.id, round_trip.code, round_trip.verification
            );
        }

        if collisions.is_empty() {
            println!("  Collisions:          none");
        } else {
            println!("  Collisions:          {}", collisions.len());
            for collision in &collisions {
                println!(
                    "    {}  reachable: {}  shadowed: {}",
                    collision.code,
                    collision.customer_ids[0],
                    collision.customer_ids[1..].join(", ")
                );
            }
        }
        println!();
    }

    if !report.passed() {
        bail!("customer code generation is inconsistent; do not deploy this build");
    }
    Ok(())
}

const fn status(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "FAILED"
    }
}

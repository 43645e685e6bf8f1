//! Normalize command implementation.

use anyhow::Result;

use stampbook_core::code::{is_valid_format, normalize_input};

use super::NormalizeArgs;

/// Run the normalize command.
pub fn run(args: &NormalizeArgs) -> Result<()> {
    let normalized = normalize_input(&args.input);
    let valid = is_valid_format(&normalized);

    if args.json {
        let output = serde_json::json!({
            "input": args.input,
            "normalized": normalized,
            "valid": valid,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if valid {
        println!("{normalized}");
    } else {
        println!("{normalized}  (not a complete code)");
    }

    Ok(())
}

//! Code command implementation.

use anyhow::{Context, Result};

use stampbook_core::code::CodeGenerator;
use stampbook_core::diagnostics::DiagnosticTrail;
use stampbook_core::qr::{self, QrConfig};

use super::CodeArgs;
use crate::ui::CodeBox;

/// Run the code command.
pub fn run(args: CodeArgs) -> Result<()> {
    let config = super::load_config();
    let qr_config = QrConfig::from(&config.qr);

    let code = CodeGenerator::new()
        .generate(&args.id)
        .with_context(|| format!("Cannot derive a code for '{}'", args.id))?;
    let deep_link = qr::create_deep_link(&code, &qr_config);

    if args.json {
        let output = serde_json::json!({
            "id": args.id,
            "code": code,
            "deep_link": deep_link,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    CodeBox::new(&code).display();
    println!();

    if args.qr {
        let rendered = qr::generate_ascii(&code, &qr_config)?;
        println!("{rendered}");
        println!("  {deep_link}");
        println!();
    }

    if args.trace {
        let trail = DiagnosticTrail::capture(&args.id)?;
        for line in trail.render().lines() {
            println!("  {line}");
        }
        println!();
    }

    Ok(())
}

//! UI utilities for Stampbook CLI.

use stampbook_core::code::CustomerCode;

const BOX_WIDTH: usize = 33;

/// A formatted box for displaying customer codes.
pub struct CodeBox<'a> {
    code: &'a CustomerCode,
    name: Option<&'a str>,
}

impl<'a> CodeBox<'a> {
    /// Create a new code box.
    #[must_use]
    pub const fn new(code: &'a CustomerCode) -> Self {
        Self { code, name: None }
    }

    /// Show the customer's name under the code.
    #[must_use]
    pub const fn with_name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    /// Display the code box to stdout.
    pub fn display(&self) {
        let code_line = format!("Code:  {}", format_code_spaced(self.code));

        println!("  ┌{}┐", "─".repeat(BOX_WIDTH));
        println!("  │{}│", " ".repeat(BOX_WIDTH));
        println!("  │{}│", center_in_box(&code_line, BOX_WIDTH));
        println!("  │{}│", " ".repeat(BOX_WIDTH));

        if let Some(name) = self.name {
            println!("  │{}│", center_in_box(name, BOX_WIDTH));
            println!("  │{}│", " ".repeat(BOX_WIDTH));
        }

        println!("  └{}┘", "─".repeat(BOX_WIDTH));
    }
}

/// Segments separated by wide gaps, easier to read aloud.
fn format_code_spaced(code: &CustomerCode) -> String {
    code.segments().join("  ")
}

fn center_in_box(content: &str, width: usize) -> String {
    let content_len = content.chars().count();
    let padding = width.saturating_sub(content_len);
    let left = padding / 2;
    let right = padding - left;
    format!("{}{}{}", " ".repeat(left), content, " ".repeat(right))
}

/// Print a command failure, with a hint when the core error carries one.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("Error: {err:#}");

    let core = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<stampbook_core::Error>());
    if let Some(core) = core {
        if let Some(code) = core.code() {
            eprintln!("  [{code}]");
        }
        if let Some(suggestion) = core.suggestion() {
            eprintln!();
            eprintln!("{suggestion}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_code_spaced() {
        let code = CustomerCode::parse("SUN-873-VPV").unwrap();
        assert_eq!(format_code_spaced(&code), "SUN  873  VPV");
    }

    #[test]
    fn test_center_in_box() {
        let centered = center_in_box("hello", 11);
        assert_eq!(centered, "   hello   ");

        let centered = center_in_box("hi", 6);
        assert_eq!(centered, "  hi  ");
    }

    #[test]
    fn test_center_in_box_overflow() {
        let long = "x".repeat(40);
        assert_eq!(center_in_box(&long, BOX_WIDTH), long);
    }
}

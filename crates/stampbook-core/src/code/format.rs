//! Code shape checks and free-text normalization.

use super::{CODE_LENGTH, SEGMENT_COUNT, SEGMENT_LENGTH, SEPARATOR};

/// Maximum number of symbols in a code, separators excluded.
const MAX_SYMBOLS: usize = SEGMENT_LENGTH * SEGMENT_COUNT;

/// Returns `true` iff `code` is exactly `^[A-Z]{3}-[0-9]{3}-[A-Z]{3}$`.
///
/// The check is case-sensitive; run user input through
/// [`normalize_input`] first.
#[must_use]
pub fn is_valid_format(code: &str) -> bool {
    let bytes = code.as_bytes();
    if bytes.len() != CODE_LENGTH {
        return false;
    }

    bytes.iter().enumerate().all(|(i, b)| match i {
        3 | 7 => *b == SEPARATOR as u8,
        4..=6 => b.is_ascii_digit(),
        _ => b.is_ascii_uppercase(),
    })
}

/// Normalize user-typed text into the canonical code layout.
///
/// Keeps ASCII letters and digits, uppercases them, truncates to nine
/// symbols and inserts separators after the third and sixth symbol. Partial
/// input yields partial output (`"ab"` -> `"AB"`, `"abcd"` -> `"ABC-D"`) so
/// the result can be echoed back while the operator is still typing.
///
/// Idempotent: `normalize_input(&normalize_input(s)) == normalize_input(s)`.
#[must_use]
pub fn normalize_input(raw: &str) -> String {
    let mut out = String::with_capacity(CODE_LENGTH);

    let symbols = raw
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(MAX_SYMBOLS);

    for (i, symbol) in symbols.enumerate() {
        if i > 0 && i % SEGMENT_LENGTH == 0 {
            out.push(SEPARATOR);
        }
        out.push(symbol);
    }

    out
}

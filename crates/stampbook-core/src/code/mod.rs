//! Customer code generation and validation.
//!
//! Every customer identifier maps to exactly one short code that a
//! customer can read out at the counter. Codes are never stored: they are
//! recomputed from the identifier whenever needed, so the generator must
//! stay bit-for-bit stable across releases.
//!
//! ## Code Format
//!
//! `LLL-NNN-LLL`: three letters, three digits, three letters.
//!
//! Symbols come from a 32-character master alphabet that excludes
//! ambiguous characters:
//! - Letters: `A-H`, `J-N`, `P-Z` (24 symbols, no `I` or `O`)
//! - Digits: `2-9` (8 symbols, no `0` or `1`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use stampbook_core::code::{CodeGenerator, CustomerCode};
//!
//! let code = CodeGenerator::new().generate("11111111-1111-1111-1111-111111111111")?;
//! assert_eq!(code.as_str(), "SUN-873-VPV");
//!
//! let typed = CustomerCode::parse("sun 873 vpv")?;
//! assert_eq!(typed, code);
//! ```

mod format;
mod generator;

pub use format::{is_valid_format, normalize_input};
pub use generator::{customer_code, generate_code, hash_identifier, CodeGenerator, GenerationTrace};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The master character set. Letters and digits partition it.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Letters used for the first and last segment.
pub const LETTER_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Digits used for the middle segment.
pub const DIGIT_ALPHABET: &[u8] = b"23456789";

/// Symbols per segment
pub const SEGMENT_LENGTH: usize = 3;

/// Number of segments in a code
pub const SEGMENT_COUNT: usize = 3;

/// Length of a formatted code, hyphens included
pub const CODE_LENGTH: usize = SEGMENT_LENGTH * SEGMENT_COUNT + SEGMENT_COUNT - 1;

/// Segment separator
pub const SEPARATOR: char = '-';

/// Returned by [`customer_code`] when no code can be produced.
///
/// It has the right shape, so callers must compare against it explicitly.
pub const SENTINEL_CODE: &str = "ERR-000-ERR";

/// Returns `true` if `code` is the generator's failure sentinel.
#[must_use]
pub fn is_sentinel(code: &str) -> bool {
    code.eq_ignore_ascii_case(SENTINEL_CODE)
}

/// A validated customer code in canonical uppercase form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerCode {
    code: String,
}

impl CustomerCode {
    /// Parse and validate a customer code from user input.
    ///
    /// Input is normalized first, so `sun873vpv` and ` SUN-873-VPV ` both
    /// parse to `SUN-873-VPV`.
    ///
    /// # Errors
    ///
    /// Returns an error if the normalized input is not a complete code.
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = normalize_input(input);

        if !is_valid_format(&normalized) {
            return Err(Error::InvalidCodeFormat(format!(
                "expected LLL-NNN-LLL, got '{}'",
                input.trim()
            )));
        }

        Ok(Self { code: normalized })
    }

    /// Wraps generator output that already has the canonical shape.
    pub(crate) fn from_canonical(code: String) -> Result<Self> {
        if is_valid_format(&code) {
            Ok(Self { code })
        } else {
            Err(Error::InvalidCodeFormat(code))
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// Returns the three segments of the code.
    #[must_use]
    pub fn segments(&self) -> [&str; SEGMENT_COUNT] {
        [&self.code[0..3], &self.code[4..7], &self.code[8..11]]
    }
}

impl std::fmt::Display for CustomerCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

impl std::str::FromStr for CustomerCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CustomerCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CustomerCode> for String {
    fn from(code: CustomerCode) -> Self {
        code.code
    }
}

impl AsRef<str> for CustomerCode {
    fn as_ref(&self) -> &str {
        &self.code
    }
}

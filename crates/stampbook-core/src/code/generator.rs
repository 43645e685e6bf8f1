//! Deterministic identifier -> code generation.
//!
//! The arithmetic here is frozen. Codes already printed on cards and shared
//! with customers are only resolvable as long as every step below produces
//! the same output, so changes must keep the golden vectors in
//! [`crate::diagnostics`] passing.

use tracing::trace;

use super::{
    is_valid_format, CustomerCode, DIGIT_ALPHABET, LETTER_ALPHABET, SEGMENT_LENGTH, SENTINEL_CODE,
    SEPARATOR,
};
use crate::error::{Error, Result};

/// Generator for customer codes.
///
/// Stateless; one instance can be shared freely between threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeGenerator;

impl CodeGenerator {
    /// Create a new code generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Generate the code for a customer identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyIdentifier`] for an empty identifier and
    /// [`Error::GenerationFailed`] if the derived symbols fall outside the
    /// alphabet.
    pub fn generate(&self, id: &str) -> Result<CustomerCode> {
        generate_code(id)
    }

    /// Generate a code and record every intermediate value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyIdentifier`] for an empty identifier.
    pub fn trace(&self, id: &str) -> Result<GenerationTrace> {
        if id.is_empty() {
            return Err(Error::EmptyIdentifier);
        }

        let hash = hash_identifier(id);
        let seeds = Seeds::from_hash(hash);
        let segments = [
            segment(seeds.first, LETTER_ALPHABET),
            segment(seeds.second, DIGIT_ALPHABET),
            segment(seeds.third, LETTER_ALPHABET),
        ];
        let code = join_segments(&segments).and_then(|c| CustomerCode::from_canonical(c).ok());

        Ok(GenerationTrace {
            id: id.to_string(),
            hash,
            seeds: [seeds.first, seeds.second, seeds.third],
            segments,
            code,
        })
    }
}

/// Every intermediate value of one generation, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTrace {
    /// Input identifier
    pub id: String,
    /// Raw 32-bit rolling hash, before taking the absolute value
    pub hash: i32,
    /// Seeds for the three segments
    pub seeds: [i64; 3],
    /// Generated segments, `None` where a symbol fell outside the alphabet
    pub segments: [Option<String>; 3],
    /// Final code, `None` if generation failed
    pub code: Option<CustomerCode>,
}

/// Generate the code for a customer identifier.
///
/// # Errors
///
/// See [`CodeGenerator::generate`].
pub fn generate_code(id: &str) -> Result<CustomerCode> {
    if id.is_empty() {
        return Err(Error::EmptyIdentifier);
    }

    let seeds = Seeds::from_hash(hash_identifier(id));
    let segments = [
        segment(seeds.first, LETTER_ALPHABET),
        segment(seeds.second, DIGIT_ALPHABET),
        segment(seeds.third, LETTER_ALPHABET),
    ];

    let code = join_segments(&segments)
        .filter(|c| is_valid_format(c))
        .ok_or_else(|| Error::GenerationFailed(id.to_string()))?;

    trace!(id, code = %code, "generated customer code");
    CustomerCode::from_canonical(code)
}

/// String-level contract: the code for `id`, or [`SENTINEL_CODE`].
///
/// Never fails. `None`, an empty identifier and internal generation
/// failures all yield the sentinel, which callers must check for with
/// [`super::is_sentinel`].
#[must_use]
pub fn customer_code(id: Option<&str>) -> String {
    id.and_then(|id| generate_code(id).ok())
        .map_or_else(|| SENTINEL_CODE.to_string(), String::from)
}

/// 32-bit polynomial rolling hash (`hash * 31 + unit`) over UTF-16 code units.
///
/// Wraps exactly like 32-bit signed integer arithmetic.
#[must_use]
pub fn hash_identifier(id: &str) -> i32 {
    id.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// The three segment seeds derived from one hash.
struct Seeds {
    first: i64,
    second: i64,
    third: i64,
}

impl Seeds {
    fn from_hash(hash: i32) -> Self {
        // |i32::MIN| does not fit in 32 bits. The first seed keeps the full
        // magnitude while the shifts see the 32-bit reinterpretation, which
        // for i32::MIN is i32::MIN again.
        let magnitude = i64::from(hash).abs();
        let wrapped = hash.wrapping_abs();

        Self {
            first: magnitude,
            second: i64::from(wrapped >> 8),
            third: i64::from(wrapped >> 16),
        }
    }
}

/// Step through `SEGMENT_LENGTH` symbols of `alphabet` driven by `seed`.
///
/// Returns `None` if an index leaves the alphabet, which only happens for
/// negative seeds.
fn segment(seed: i64, alphabet: &[u8]) -> Option<String> {
    let base = alphabet.len() as i64;
    let mut current = seed.abs();
    let mut out = String::with_capacity(SEGMENT_LENGTH);

    for step in 1..=SEGMENT_LENGTH as i64 {
        let index = usize::try_from(current % base).ok()?;
        out.push(char::from(*alphabet.get(index)?));

        current = current.div_euclid(base) + seed * step;
        if current == 0 {
            current = seed + step;
        }
    }

    Some(out)
}

fn join_segments(segments: &[Option<String>; 3]) -> Option<String> {
    let [first, second, third] = segments;
    Some(format!(
        "{}{SEPARATOR}{}{SEPARATOR}{}",
        first.as_deref()?,
        second.as_deref()?,
        third.as_deref()?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::is_sentinel;

    #[test]
    fn test_hash_matches_recorded_values() {
        assert_eq!(hash_identifier(""), 0);
        assert_eq!(hash_identifier("a"), 97);
        assert_eq!(hash_identifier("abc"), 96_354);
        assert_eq!(hash_identifier("customer-1"), -1_581_185_534);
        assert_eq!(
            hash_identifier("11111111-1111-1111-1111-111111111111"),
            -407_076_544
        );
        assert_eq!(
            hash_identifier("ffffffff-ffff-ffff-ffff-ffffffffffff"),
            1_066_837_568
        );
    }

    #[test]
    fn test_hash_uses_utf16_units() {
        // surrogate pair: two units, not one code point
        assert_eq!(hash_identifier("😀"), 1_772_899);
    }

    #[test]
    fn test_known_codes() {
        let generator = CodeGenerator::new();
        assert_eq!(generator.generate("a").unwrap().as_str(), "BFG-234-ABC");
        assert_eq!(generator.generate("abc").unwrap().as_str(), "UAU-296-BBC");
        assert_eq!(
            generator
                .generate("11111111-1111-1111-1111-111111111111")
                .unwrap()
                .as_str(),
            "SUN-873-VPV"
        );
    }

    #[test]
    fn test_segment_stepping() {
        // seed 0: every step resets to seed + step
        assert_eq!(segment(0, LETTER_ALPHABET).as_deref(), Some("ABC"));
        assert_eq!(segment(0, DIGIT_ALPHABET).as_deref(), Some("234"));
        assert_eq!(segment(97, LETTER_ALPHABET).as_deref(), Some("BFG"));
    }

    #[test]
    fn test_negative_seed_leaves_alphabet() {
        assert_eq!(segment(-32_768, LETTER_ALPHABET), None);
    }

    #[test]
    fn test_min_hash_fails_generation() {
        let seeds = Seeds::from_hash(i32::MIN);
        assert_eq!(seeds.first, 2_147_483_648);
        assert_eq!(seeds.second, -8_388_608);
        assert_eq!(seeds.third, -32_768);

        assert_eq!(segment(seeds.first, LETTER_ALPHABET).as_deref(), Some("JPM"));
        assert_eq!(segment(seeds.second, DIGIT_ALPHABET).as_deref(), Some("222"));
        assert_eq!(segment(seeds.third, LETTER_ALPHABET), None);
    }

    #[test]
    fn test_max_hash() {
        let seeds = Seeds::from_hash(i32::MAX);
        let segments = [
            segment(seeds.first, LETTER_ALPHABET),
            segment(seeds.second, DIGIT_ALPHABET),
            segment(seeds.third, LETTER_ALPHABET),
        ];
        assert_eq!(join_segments(&segments).as_deref(), Some("HNK-987-HEW"));

        // |-(2^31 - 1)| == 2^31 - 1
        let seeds = Seeds::from_hash(-i32::MAX);
        assert_eq!(seeds.first, i64::from(i32::MAX));
    }

    #[test]
    fn test_empty_identifier() {
        assert!(matches!(generate_code(""), Err(Error::EmptyIdentifier)));
        assert!(matches!(
            CodeGenerator::new().trace(""),
            Err(Error::EmptyIdentifier)
        ));
    }

    #[test]
    fn test_sentinel_contract() {
        assert_eq!(customer_code(None), SENTINEL_CODE);
        assert_eq!(customer_code(Some("")), SENTINEL_CODE);
        assert!(is_sentinel(&customer_code(Some(""))));
        assert_eq!(customer_code(Some("a")), "BFG-234-ABC");
    }

    #[test]
    fn test_deterministic() {
        let id = "550e8400-e29b-41d4-a716-446655440000";
        let first = generate_code(id).unwrap();
        for _ in 0..100 {
            assert_eq!(generate_code(id).unwrap(), first);
        }
        assert_eq!(first.as_str(), "XLU-987-MYG");
    }

    #[test]
    fn test_trace_matches_generate() {
        let id = "customer-1";
        let trace = CodeGenerator::new().trace(id).unwrap();
        assert_eq!(trace.hash, -1_581_185_534);
        assert_eq!(trace.seeds[0], 1_581_185_534);
        assert_eq!(trace.seeds[1], 1_581_185_534 >> 8);
        assert_eq!(trace.seeds[2], 1_581_185_534 >> 16);
        assert_eq!(trace.code, Some(generate_code(id).unwrap()));
        assert_eq!(trace.code.unwrap().as_str(), "QJS-327-GDD");
    }

    #[test]
    fn test_hash_collision_gives_same_code() {
        // "Aa" and "BB" share the same 31-polynomial hash
        assert_eq!(hash_identifier("Aa"), hash_identifier("BB"));
        assert_eq!(generate_code("Aa").unwrap(), generate_code("BB").unwrap());
        assert_eq!(generate_code("Aa").unwrap().as_str(), "ASV-233-ABC");
    }
}

//! Consistency checks for the code generator.
//!
//! Printed and shared codes only stay resolvable while the generator keeps
//! producing the same output for the same identifier. This module re-runs
//! generation and compares, checks a fixed set of recorded golden vectors,
//! reports identifiers whose codes collide, and renders step-by-step
//! generation trails for humans.
//!
//! Any mismatch reported here is a critical regression.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use tracing::{error, warn};

use crate::code::{
    customer_code, is_sentinel, CodeGenerator, CustomerCode, GenerationTrace, SENTINEL_CODE,
};
use crate::directory::DirectoryEntry;
use crate::error::Result;

/// Identifiers with codes recorded from the deployed web client.
const GOLDEN_VECTORS: &[(&str, &str)] = &[
    ("a", "BFG-234-ABC"),
    ("x", "AFF-234-ABC"),
    ("Z", "UXR-234-ABC"),
    ("abc", "UAU-296-BBC"),
    ("Aa", "ASV-233-ABC"),
    ("customer-1", "QJS-327-GDD"),
    ("Jane Doe", "JCH-268-ATN"),
    ("héllo", "YVK-363-PGY"),
    ("😀", "VTU-789-DEH"),
    ("user_2NNEqL7pYfGEvC0N6R6sWa1TzM4", "LLY-455-BQL"),
    ("00000000-0000-0000-0000-000000000000", "AJY-245-NJL"),
    ("11111111-1111-1111-1111-111111111111", "SUN-873-VPV"),
    ("22222222-2222-2222-2222-222222222222", "JFZ-427-NWQ"),
    ("33333333-3333-3333-3333-333333333333", "SCN-597-EXG"),
    ("550e8400-e29b-41d4-a716-446655440000", "XLU-987-MYG"),
    ("6ba7b810-9dad-11d1-80b4-00c04fd430c8", "XUP-364-MKA"),
    ("f47ac10b-58cc-4372-a567-0e02b2c3d479", "PZY-587-MKY"),
    ("ffffffff-ffff-ffff-ffff-ffffffffffff", "JXB-845-GNY"),
];

/// Recorded `(identifier, code)` pairs.
#[must_use]
pub fn golden_vectors() -> &'static [(&'static str, &'static str)] {
    GOLDEN_VECTORS
}

/// Two generations of the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundTrip {
    /// Input identifier
    pub id: String,
    /// First generation
    pub code: String,
    /// Second generation
    pub verification: String,
}

impl RoundTrip {
    /// Returns `true` if both generations agree and produced a real code.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.code == self.verification && !is_sentinel(&self.code)
    }
}

/// Generate the code for `id` twice.
#[must_use]
pub fn test_round_trip(id: &str) -> RoundTrip {
    let code = customer_code(Some(id));
    let verification = customer_code(Some(id));
    RoundTrip {
        id: id.to_string(),
        code,
        verification,
    }
}

/// A golden vector whose current output differs from the recorded code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoldenMismatch {
    /// Input identifier
    pub id: String,
    /// Recorded code
    pub expected: String,
    /// Code produced now
    pub actual: String,
}

/// Outcome of a consistency run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConsistencyReport {
    /// Identifiers checked
    pub checked: usize,
    /// Round trips that disagreed or failed
    pub mismatches: Vec<RoundTrip>,
    /// Golden vectors that no longer match
    pub golden_mismatches: Vec<GoldenMismatch>,
}

impl ConsistencyReport {
    /// Returns `true` if nothing regressed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty() && self.golden_mismatches.is_empty()
    }
}

/// Round-trip every identifier in `ids` and check the golden vectors.
pub fn check_consistency<'a, I>(ids: I) -> ConsistencyReport
where
    I: IntoIterator<Item = &'a str>,
{
    let mut report = ConsistencyReport {
        golden_mismatches: verify_golden_vectors(),
        ..ConsistencyReport::default()
    };

    for id in ids {
        report.checked += 1;
        let round_trip = test_round_trip(id);
        if !round_trip.is_consistent() {
            error!(
                id = %round_trip.id,
                code = %round_trip.code,
                verification = %round_trip.verification,
                "customer code round trip failed"
            );
            report.mismatches.push(round_trip);
        }
    }

    report
}

/// Golden vectors whose output changed.
#[must_use]
pub fn verify_golden_vectors() -> Vec<GoldenMismatch> {
    GOLDEN_VECTORS
        .iter()
        .filter_map(|&(id, expected)| {
            let actual = customer_code(Some(id));
            (actual != expected).then(|| {
                error!(id, expected, actual = %actual, "golden vector mismatch");
                GoldenMismatch {
                    id: id.to_string(),
                    expected: expected.to_string(),
                    actual,
                }
            })
        })
        .collect()
}

/// Customers sharing one code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    /// The shared code
    pub code: CustomerCode,
    /// Identifiers in directory order; only the first is reachable
    pub customer_ids: Vec<String>,
}

/// Group directory entries by code and return the groups with more than one
/// member, ordered by code.
#[must_use]
pub fn find_collisions(entries: &[DirectoryEntry]) -> Vec<Collision> {
    let mut by_code: BTreeMap<CustomerCode, Vec<String>> = BTreeMap::new();
    let generator = CodeGenerator::new();

    for entry in entries {
        if let Ok(code) = generator.generate(&entry.id) {
            by_code.entry(code).or_default().push(entry.id.clone());
        }
    }

    by_code
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(code, customer_ids)| {
            warn!(code = %code, count = customer_ids.len(), "customer code collision");
            Collision { code, customer_ids }
        })
        .collect()
}

/// Human-readable trail of one generation.
#[derive(Debug, Clone)]
pub struct DiagnosticTrail {
    trace: GenerationTrace,
    verification: Option<CustomerCode>,
}

impl DiagnosticTrail {
    /// Trace `id` and generate it a second time for comparison.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty identifier.
    pub fn capture(id: &str) -> Result<Self> {
        let generator = CodeGenerator::new();
        let trace = generator.trace(id)?;
        let verification = generator.generate(id).ok();
        Ok(Self {
            trace,
            verification,
        })
    }

    /// The underlying trace.
    #[must_use]
    pub fn trace(&self) -> &GenerationTrace {
        &self.trace
    }

    /// Returns `true` if the traced code and the second generation agree.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.trace.code.is_some() && self.trace.code == self.verification
    }

    /// Render the trail as indented text lines.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let t = &self.trace;
        let missing = "<outside alphabet>";

        let _ = writeln!(out, "identifier   {:?}", t.id);
        let _ = writeln!(out, "utf-16 units {}", t.id.encode_utf16().count());
        let _ = writeln!(out, "hash (i32)   {}", t.hash);
        for (i, (seed, segment)) in t.seeds.iter().zip(&t.segments).enumerate() {
            let _ = writeln!(
                out,
                "segment {}    seed {:>10} -> {}",
                i + 1,
                seed,
                segment.as_deref().unwrap_or(missing)
            );
        }
        let code = t.code.as_ref().map_or(SENTINEL_CODE, CustomerCode::as_str);
        let verification = self
            .verification
            .as_ref()
            .map_or(SENTINEL_CODE, CustomerCode::as_str);
        let _ = writeln!(out, "code         {code}");
        let _ = writeln!(out, "verification {verification}");
        let _ = write!(
            out,
            "status       {}",
            if self.is_consistent() { "consistent" } else { "MISMATCH" }
        );
        out
    }
}

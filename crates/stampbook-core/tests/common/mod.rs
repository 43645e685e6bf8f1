//! Common test utilities for `Stampbook` integration tests.
//!
//! This module provides directory fixtures and identifier generators shared
//! by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;
use stampbook_core::directory::{
    CustomerDirectory, CustomerProfile, Enrollment, EnrollmentReader, MemoryDirectory,
};
use stampbook_core::verify::EnrollmentVerifier;

/// Identifier of the Jane Doe fixture customer.
pub const JANE_ID: &str = "11111111-1111-1111-1111-111111111111";

/// Jane Doe's customer code.
pub const JANE_CODE: &str = "SUN-873-VPV";

/// Business Jane has not joined.
pub const UNJOINED_BUSINESS: &str = "biz-42";

/// Business Jane has joined.
pub const JOINED_BUSINESS: &str = "biz-other-id-with-a-row";

/// Directory with Jane Doe enrolled at [`JOINED_BUSINESS`] only, plus a
/// nameless customer enrolled at [`UNJOINED_BUSINESS`].
pub fn jane_doe_directory() -> MemoryDirectory {
    MemoryDirectory::new()
        .with_customer(JANE_ID, Some("Jane Doe"))
        .with_customer("22222222-2222-2222-2222-222222222222", None)
        .with_customer("33333333-3333-3333-3333-333333333333", Some("Sam"))
        .with_enrollment(Enrollment::new(JANE_ID, JOINED_BUSINESS).with_points(120))
        .with_enrollment(Enrollment::new(
            "22222222-2222-2222-2222-222222222222",
            UNJOINED_BUSINESS,
        ))
}

/// Verifier reading both tables from `directory`.
pub fn verifier(directory: MemoryDirectory) -> EnrollmentVerifier {
    let (customers, enrollments) = shared(directory);
    EnrollmentVerifier::new(customers, enrollments)
}

/// Share one directory as both trait objects.
pub fn shared(
    directory: MemoryDirectory,
) -> (Arc<dyn CustomerDirectory>, Arc<dyn EnrollmentReader>) {
    let directory = Arc::new(directory);
    (directory.clone(), directory)
}

/// Directory holding `ids` as nameless customers, in order.
pub fn directory_of(ids: &[String]) -> MemoryDirectory {
    ids.iter().fold(MemoryDirectory::new(), |dir, id| {
        dir.with_profile(CustomerProfile::customer(id.clone(), None))
    })
}

/// Random lowercase UUID-shaped identifier.
pub fn random_uuid_like<R: Rng>(rng: &mut R) -> String {
    let hex: String = (0..32)
        .map(|_| char::from_digit(rng.gen_range(0..16), 16).unwrap_or('0'))
        .collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Random identifier: alphanumeric, UUID-shaped or arbitrary Unicode.
pub fn random_identifier<R: Rng>(rng: &mut R) -> String {
    match rng.gen_range(0..3) {
        0 => random_uuid_like(rng),
        1 => {
            let len = rng.gen_range(1..40);
            rng.sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect()
        }
        _ => {
            let len = rng.gen_range(1..12);
            (0..len).map(|_| rng.gen::<char>()).collect()
        }
    }
}

/// `count` distinct random UUID-shaped identifiers.
pub fn distinct_uuids<R: Rng>(rng: &mut R, count: usize) -> Vec<String> {
    let mut ids = std::collections::BTreeSet::new();
    while ids.len() < count {
        ids.insert(random_uuid_like(rng));
    }
    ids.into_iter().collect()
}

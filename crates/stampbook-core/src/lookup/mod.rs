//! Reverse lookup from customer code to customer identifier.
//!
//! Codes are never stored, so a code is resolved by regenerating the code of
//! every customer in the directory and comparing. This is O(n) in the number
//! of customers per lookup. The directory is fetched once per lookup, never
//! once per candidate.
//!
//! [`Resolver`] can put a [`CodeIndex`] in front of the scan. The index is a
//! cache of the generator keyed by the directory revision; the directory
//! stays the only source of truth.

mod index;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace, warn};

pub use index::{CodeIndex, IndexCache};

use crate::code::{generate_code, CustomerCode};
use crate::directory::{CustomerDirectory, DirectoryEntry, Role};
use crate::error::Result;

/// Result of resolving a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "customer_id", rename_all = "snake_case")]
pub enum LookupOutcome {
    /// The code belongs to this customer identifier
    Found(String),
    /// Well-formed code that no customer reproduces
    NotFound,
    /// Input is not a code; the directory was not consulted
    Malformed,
}

impl LookupOutcome {
    /// The resolved identifier, if any.
    #[must_use]
    pub fn customer_id(&self) -> Option<&str> {
        match self {
            Self::Found(id) => Some(id),
            Self::NotFound | Self::Malformed => None,
        }
    }
}

/// Resolve `code` against every customer in `directory`.
///
/// Input is normalized first, so lowercase or unhyphenated codes resolve
/// like their canonical form.
///
/// # Errors
///
/// Returns an error only if the directory query fails. An unknown code is
/// [`LookupOutcome::NotFound`], never an error.
pub async fn resolve_code<D>(code: &str, directory: &D) -> Result<LookupOutcome>
where
    D: CustomerDirectory + ?Sized,
{
    let Ok(target) = CustomerCode::parse(code) else {
        debug!(input = code, "rejecting malformed code before lookup");
        return Ok(LookupOutcome::Malformed);
    };

    let entries = directory.entries_by_role(Role::Customer).await?;
    Ok(outcome_from_scan(&target, &entries))
}

/// First entry, in directory order, whose generated code equals `target`.
pub(crate) fn scan<'a>(
    target: &CustomerCode,
    entries: &'a [DirectoryEntry],
) -> Option<&'a DirectoryEntry> {
    entries.iter().find(|entry| match generate_code(&entry.id) {
        Ok(code) => {
            trace!(id = %entry.id, code = %code, "checking candidate");
            code == *target
        }
        Err(e) => {
            warn!(id = %entry.id, error = %e, "skipping candidate without a code");
            false
        }
    })
}

fn outcome_from_scan(target: &CustomerCode, entries: &[DirectoryEntry]) -> LookupOutcome {
    let found = scan(target, entries);
    debug!(
        code = %target,
        candidates = entries.len(),
        found = found.is_some(),
        "linear code lookup finished"
    );

    found.map_or(LookupOutcome::NotFound, |entry| {
        LookupOutcome::Found(entry.id.clone())
    })
}

/// Resolves codes against one directory, optionally through an index cache.
#[derive(Clone)]
pub struct Resolver {
    directory: Arc<dyn CustomerDirectory>,
    cache: Option<Arc<IndexCache>>,
}

impl Resolver {
    /// Create a resolver that always scans the directory.
    #[must_use]
    pub fn new(directory: Arc<dyn CustomerDirectory>) -> Self {
        Self {
            directory,
            cache: None,
        }
    }

    /// Enable the reverse-index cache for directories with at least
    /// `threshold` customers.
    #[must_use]
    pub fn with_cache(mut self, threshold: usize) -> Self {
        self.cache = Some(Arc::new(IndexCache::new(threshold)));
        self
    }

    /// The directory this resolver reads.
    #[must_use]
    pub fn directory(&self) -> &Arc<dyn CustomerDirectory> {
        &self.directory
    }

    /// Resolve a code.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory query fails.
    pub async fn resolve(&self, code: &str) -> Result<LookupOutcome> {
        match &self.cache {
            Some(cache) => cache.resolve(code, self.directory.as_ref()).await,
            None => resolve_code(code, self.directory.as_ref()).await,
        }
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{CustomerProfile, MemoryDirectory};
    use crate::error::Error;
    use async_trait::async_trait;

    struct FailingDirectory;

    #[async_trait]
    impl CustomerDirectory for FailingDirectory {
        async fn entries_by_role(&self, _role: Role) -> Result<Vec<DirectoryEntry>> {
            Err(Error::Directory("connection refused".into()))
        }

        async fn profile(&self, _id: &str) -> Result<Option<CustomerProfile>> {
            Err(Error::Directory("connection refused".into()))
        }
    }

    fn sample_directory() -> MemoryDirectory {
        MemoryDirectory::new()
            .with_customer("11111111-1111-1111-1111-111111111111", Some("Jane Doe"))
            .with_customer("550e8400-e29b-41d4-a716-446655440000", None)
            .with_customer("customer-1", Some("Sam"))
    }

    #[tokio::test]
    async fn test_resolves_known_code() {
        let outcome = resolve_code("SUN-873-VPV", &sample_directory()).await.unwrap();
        assert_eq!(
            outcome,
            LookupOutcome::Found("11111111-1111-1111-1111-111111111111".into())
        );
    }

    #[tokio::test]
    async fn test_lowercase_resolves_like_uppercase() {
        let directory = sample_directory();
        let upper = resolve_code("XLU-987-MYG", &directory).await.unwrap();
        let lower = resolve_code("xlu-987-myg", &directory).await.unwrap();
        assert_eq!(upper, lower);
        assert_eq!(lower.customer_id(), Some("550e8400-e29b-41d4-a716-446655440000"));
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let outcome = resolve_code("ZZZ-999-ZZZ", &sample_directory()).await.unwrap();
        assert_eq!(outcome, LookupOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_malformed_code_skips_directory() {
        // a failing directory proves the query never happens
        let outcome = resolve_code("not a code", &FailingDirectory).await.unwrap();
        assert_eq!(outcome, LookupOutcome::Malformed);
    }

    #[tokio::test]
    async fn test_directory_failure_propagates() {
        let result = resolve_code("SUN-873-VPV", &FailingDirectory).await;
        assert!(matches!(result, Err(Error::Directory(_))));
    }

    #[tokio::test]
    async fn test_business_accounts_are_never_candidates() {
        let directory = MemoryDirectory::new().with_profile(
            CustomerProfile::customer("11111111-1111-1111-1111-111111111111", None)
                .with_role(Role::Business),
        );
        let outcome = resolve_code("SUN-873-VPV", &directory).await.unwrap();
        assert_eq!(outcome, LookupOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_first_match_wins_on_collision() {
        let directory = MemoryDirectory::new()
            .with_customer("BB", None)
            .with_customer("Aa", None);
        let outcome = resolve_code("ASV-233-ABC", &directory).await.unwrap();
        assert_eq!(outcome, LookupOutcome::Found("BB".into()));
    }

    #[tokio::test]
    async fn test_sentinel_never_resolves() {
        let directory = sample_directory().with_customer("", None);
        let outcome = resolve_code("ERR-000-ERR", &directory).await.unwrap();
        assert_eq!(outcome, LookupOutcome::NotFound);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&LookupOutcome::Found("c1".into())).unwrap();
        assert_eq!(json, r#"{"status":"found","customer_id":"c1"}"#);
        let json = serde_json::to_string(&LookupOutcome::Malformed).unwrap();
        assert_eq!(json, r#"{"status":"malformed"}"#);
    }
}

//! Reverse-index cache for code lookups.
//!
//! A [`CodeIndex`] maps every generated code to the first customer (in
//! directory order) that produces it, so answers always agree with the
//! linear scan. It is tagged with the directory revision it was built from
//! and rebuilt as soon as the revision moves. It is never persisted and can
//! always be reconstructed by rerunning the generator over the directory.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use super::{outcome_from_scan, LookupOutcome};
use crate::code::{generate_code, CustomerCode};
use crate::directory::{CustomerDirectory, DirectoryEntry, Role};
use crate::error::Result;

/// Code -> customer identifier map built from one directory revision.
#[derive(Debug, Clone, Default)]
pub struct CodeIndex {
    revision: u64,
    codes: HashMap<CustomerCode, String>,
    shadowed: usize,
}

impl CodeIndex {
    /// Build an index over `entries`.
    #[must_use]
    pub fn build(revision: u64, entries: &[DirectoryEntry]) -> Self {
        let mut codes = HashMap::with_capacity(entries.len());
        let mut shadowed = 0;

        for entry in entries {
            let Ok(code) = generate_code(&entry.id) else {
                continue;
            };
            match codes.entry(code) {
                std::collections::hash_map::Entry::Vacant(slot) => {
                    slot.insert(entry.id.clone());
                }
                std::collections::hash_map::Entry::Occupied(slot) => {
                    shadowed += 1;
                    warn!(
                        code = %slot.key(),
                        kept = %slot.get(),
                        shadowed = %entry.id,
                        "customer code collision, later customer is unreachable"
                    );
                }
            }
        }

        Self {
            revision,
            codes,
            shadowed,
        }
    }

    /// Customer identifier for `code`, if indexed.
    #[must_use]
    pub fn get(&self, code: &CustomerCode) -> Option<&str> {
        self.codes.get(code).map(String::as_str)
    }

    /// Directory revision this index was built from.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of distinct codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns `true` if the index holds no codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Customers whose code was already taken by an earlier customer.
    #[must_use]
    pub fn shadowed(&self) -> usize {
        self.shadowed
    }
}

/// Holds the most recent [`CodeIndex`] for one directory.
#[derive(Debug)]
pub struct IndexCache {
    threshold: usize,
    current: RwLock<Option<Arc<CodeIndex>>>,
}

impl IndexCache {
    /// Create an empty cache. Directories with fewer than `threshold`
    /// customers are scanned instead of indexed.
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            current: RwLock::new(None),
        }
    }

    /// Index for `revision`, if one is cached.
    fn cached(&self, revision: u64) -> Option<Arc<CodeIndex>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|index| index.revision == revision)
            .cloned()
    }

    fn store(&self, index: Arc<CodeIndex>) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(index);
    }

    /// Drop the cached index.
    pub fn invalidate(&self) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Revision of the cached index, if any.
    #[must_use]
    pub fn cached_revision(&self) -> Option<u64> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|index| index.revision)
    }

    /// Resolve `code`, answering from the index when possible.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory query fails.
    pub async fn resolve(
        &self,
        code: &str,
        directory: &dyn CustomerDirectory,
    ) -> Result<LookupOutcome> {
        let Ok(target) = CustomerCode::parse(code) else {
            return Ok(LookupOutcome::Malformed);
        };

        // Read the revision before the entries: an index tagged with an older
        // revision than its contents is rebuilt on the next lookup.
        let Some(revision) = directory.revision().await? else {
            let entries = directory.entries_by_role(Role::Customer).await?;
            return Ok(outcome_from_scan(&target, &entries));
        };

        if let Some(index) = self.cached(revision) {
            debug!(code = %target, revision, "answering from code index");
            return Ok(outcome_from_index(&index, &target));
        }

        let entries = directory.entries_by_role(Role::Customer).await?;
        if entries.len() < self.threshold {
            return Ok(outcome_from_scan(&target, &entries));
        }

        let index = Arc::new(CodeIndex::build(revision, &entries));
        info!(
            revision,
            customers = entries.len(),
            codes = index.len(),
            "rebuilt customer code index"
        );
        let outcome = outcome_from_index(&index, &target);
        self.store(index);
        Ok(outcome)
    }
}

fn outcome_from_index(index: &CodeIndex, target: &CustomerCode) -> LookupOutcome {
    index
        .get(target)
        .map_or(LookupOutcome::NotFound, |id| LookupOutcome::Found(id.to_string()))
}

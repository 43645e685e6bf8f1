//! Customer directory and enrollment access.
//!
//! The code subsystem never owns customer or enrollment data. It reads them
//! through the two traits in this module, so any store (a relational
//! backend, a key-value service, the bundled [`crate::store::JsonStore`] or
//! an in-memory fixture) can sit behind a lookup.
//!
//! Implementations are expected to perform network or disk I/O, so every
//! method is async and errors surface as [`Error::Directory`] rather than
//! as empty results.
//!
//! [`Error::Directory`]: crate::error::Error::Directory

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Role tag on a directory entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A loyalty customer
    #[default]
    Customer,
    /// A business account
    Business,
    /// An administrator
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Customer => "customer",
            Self::Business => "business",
            Self::Admin => "admin",
        };
        f.write_str(name)
    }
}

/// One `(id, name)` pair returned by a role query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Customer identifier
    pub id: String,
    /// Display name, if the profile has one
    pub name: Option<String>,
}

/// A full directory profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    /// Customer identifier
    pub id: String,
    /// Display name, if set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Role tag
    #[serde(default)]
    pub role: Role,
}

impl CustomerProfile {
    /// Create a customer profile.
    #[must_use]
    pub fn customer(id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
            role: Role::Customer,
        }
    }

    /// Set the role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Display name, or `placeholder` when the profile has none.
    ///
    /// Blank names count as missing.
    #[must_use]
    pub fn display_name_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(placeholder)
    }
}

impl From<&CustomerProfile> for DirectoryEntry {
    fn from(profile: &CustomerProfile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
        }
    }
}

/// A customer's membership in one business's loyalty program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Customer identifier
    pub customer_id: String,
    /// Business identifier
    pub business_id: String,
    /// Current points balance
    pub points: u64,
    /// When the customer joined the program
    pub joined_at: DateTime<Utc>,
}

impl Enrollment {
    /// Create a new enrollment with a zero balance.
    #[must_use]
    pub fn new(customer_id: impl Into<String>, business_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            business_id: business_id.into(),
            points: 0,
            joined_at: Utc::now(),
        }
    }

    /// Set the points balance.
    #[must_use]
    pub fn with_points(mut self, points: u64) -> Self {
        self.points = points;
        self
    }
}

/// Read access to the customer directory.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// All entries carrying `role`, in the directory's stable order.
    async fn entries_by_role(&self, role: Role) -> Result<Vec<DirectoryEntry>>;

    /// Full profile for one identifier, if it exists.
    async fn profile(&self, id: &str) -> Result<Option<CustomerProfile>>;

    /// A counter that changes whenever the set of identifiers changes.
    ///
    /// Directories that cannot report one return `Ok(None)`, which disables
    /// reverse-index caching for them.
    async fn revision(&self) -> Result<Option<u64>> {
        Ok(None)
    }
}

/// Read access to enrollment records.
#[async_trait]
pub trait EnrollmentReader: Send + Sync {
    /// The enrollment for `(customer_id, business_id)`, if one exists.
    async fn enrollment(&self, customer_id: &str, business_id: &str)
        -> Result<Option<Enrollment>>;
}

#[async_trait]
impl<T: CustomerDirectory + ?Sized> CustomerDirectory for Arc<T> {
    async fn entries_by_role(&self, role: Role) -> Result<Vec<DirectoryEntry>> {
        (**self).entries_by_role(role).await
    }

    async fn profile(&self, id: &str) -> Result<Option<CustomerProfile>> {
        (**self).profile(id).await
    }

    async fn revision(&self) -> Result<Option<u64>> {
        (**self).revision().await
    }
}

#[async_trait]
impl<T: EnrollmentReader + ?Sized> EnrollmentReader for Arc<T> {
    async fn enrollment(
        &self,
        customer_id: &str,
        business_id: &str,
    ) -> Result<Option<Enrollment>> {
        (**self).enrollment(customer_id, business_id).await
    }
}

/// In-memory directory and enrollment table.
///
/// Holds a snapshot; useful for tests, fixtures and for callers that load
/// the directory once per request.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    profiles: Vec<CustomerProfile>,
    enrollments: HashMap<(String, String), Enrollment>,
    revision: u64,
}

impl MemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a profile, replacing any profile with the same identifier.
    pub fn insert_profile(&mut self, profile: CustomerProfile) {
        if let Some(existing) = self.profiles.iter_mut().find(|p| p.id == profile.id) {
            *existing = profile;
        } else {
            self.profiles.push(profile);
        }
        self.revision += 1;
    }

    /// Add a customer by identifier and optional name.
    #[must_use]
    pub fn with_customer(mut self, id: impl Into<String>, name: Option<&str>) -> Self {
        self.insert_profile(CustomerProfile::customer(id, name.map(String::from)));
        self
    }

    /// Add an arbitrary profile.
    #[must_use]
    pub fn with_profile(mut self, profile: CustomerProfile) -> Self {
        self.insert_profile(profile);
        self
    }

    /// Add an enrollment.
    #[must_use]
    pub fn with_enrollment(mut self, enrollment: Enrollment) -> Self {
        self.insert_enrollment(enrollment);
        self
    }

    /// Add or replace an enrollment.
    pub fn insert_enrollment(&mut self, enrollment: Enrollment) {
        let key = (
            enrollment.customer_id.clone(),
            enrollment.business_id.clone(),
        );
        self.enrollments.insert(key, enrollment);
    }

    /// All profiles, in insertion order.
    #[must_use]
    pub fn profiles(&self) -> &[CustomerProfile] {
        &self.profiles
    }
}

#[async_trait]
impl CustomerDirectory for MemoryDirectory {
    async fn entries_by_role(&self, role: Role) -> Result<Vec<DirectoryEntry>> {
        Ok(self
            .profiles
            .iter()
            .filter(|p| p.role == role)
            .map(DirectoryEntry::from)
            .collect())
    }

    async fn profile(&self, id: &str) -> Result<Option<CustomerProfile>> {
        Ok(self.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn revision(&self) -> Result<Option<u64>> {
        Ok(Some(self.revision))
    }
}

#[async_trait]
impl EnrollmentReader for MemoryDirectory {
    async fn enrollment(
        &self,
        customer_id: &str,
        business_id: &str,
    ) -> Result<Option<Enrollment>> {
        Ok(self
            .enrollments
            .get(&(customer_id.to_string(), business_id.to_string()))
            .cloned())
    }
}

//! JSON file backed customer directory and enrollment table.
//!
//! Stands in for the managed backend when Stampbook runs on its own: the
//! CLI manages customers and enrollments here and the lookup pipeline reads
//! them through the [`CustomerDirectory`] and [`EnrollmentReader`] traits.
//!
//! ## Layout
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.local/share/stampbook/store.json` |
//! | macOS | `~/Library/Application Support/com.stampbook.Stampbook/store.json` |
//! | Windows | `%APPDATA%\Stampbook\data\store.json` |
//!
//! Customer codes are never written to the file.

use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::directory::{
    CustomerDirectory, CustomerProfile, DirectoryEntry, Enrollment, EnrollmentReader, Role,
};
use crate::error::{Error, Result};

/// Current on-disk format version.
const STORE_VERSION: u32 = 1;

/// Serializable wrapper for the store file.
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    /// Version of the store format
    version: u32,
    /// Bumped whenever the identifier set changes
    #[serde(default)]
    revision: u64,
    /// Directory profiles
    #[serde(default)]
    profiles: Vec<CustomerProfile>,
    /// Enrollment records
    #[serde(default)]
    enrollments: Vec<Enrollment>,
}

/// Directory and enrollment table persisted as one JSON file.
#[derive(Debug)]
pub struct JsonStore {
    /// Path to the store file
    path: PathBuf,
    /// Identifier-set revision
    revision: u64,
    /// Directory profiles
    profiles: Vec<CustomerProfile>,
    /// Enrollment records
    enrollments: Vec<Enrollment>,
}

impl JsonStore {
    /// Load the store from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be loaded.
    pub fn load() -> Result<Self> {
        let path = Self::default_path().unwrap_or_else(|| PathBuf::from("store.json"));
        Self::load_from(path)
    }

    /// Load from a specific path. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                revision: 0,
                profiles: Vec::new(),
                enrollments: Vec::new(),
            });
        }

        let file = fs::File::open(&path).map_err(|e| {
            Error::StoreError(format!(
                "Failed to open store at {}: {}",
                path.display(),
                e
            ))
        })?;

        let reader = BufReader::new(file);
        let data: StoreFile = serde_json::from_reader(reader).map_err(|e| {
            Error::StoreError(format!(
                "Failed to parse store at {}: {}",
                path.display(),
                e
            ))
        })?;

        if data.version > STORE_VERSION {
            return Err(Error::StoreError(format!(
                "store at {} has version {}, newest supported is {}",
                path.display(),
                data.version,
                STORE_VERSION
            )));
        }

        debug!(
            path = %path.display(),
            profiles = data.profiles.len(),
            enrollments = data.enrollments.len(),
            "loaded store"
        );

        Ok(Self {
            path,
            revision: data.revision,
            profiles: data.profiles,
            enrollments: data.enrollments,
        })
    }

    /// Get the default store path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stampbook", "Stampbook")
            .map(|dirs| dirs.data_dir().join("store.json"))
    }

    /// Save the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be saved.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    Error::StoreError(format!(
                        "Failed to create store directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let data = StoreFile {
            version: STORE_VERSION,
            revision: self.revision,
            profiles: self.profiles.clone(),
            enrollments: self.enrollments.clone(),
        };

        let file = fs::File::create(&self.path).map_err(|e| {
            Error::StoreError(format!(
                "Failed to create store at {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &data).map_err(|e| {
            Error::StoreError(format!(
                "Failed to write store at {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Get the path to the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All profiles, in insertion order.
    #[must_use]
    pub fn profiles(&self) -> &[CustomerProfile] {
        &self.profiles
    }

    /// Find a profile by identifier.
    #[must_use]
    pub fn find_profile(&self, id: &str) -> Option<&CustomerProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Add a profile.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateCustomer`] if the identifier is taken, or an
    /// error if the store cannot be saved.
    pub fn add_profile(&mut self, profile: CustomerProfile) -> Result<()> {
        if self.find_profile(&profile.id).is_some() {
            return Err(Error::DuplicateCustomer(profile.id));
        }
        self.profiles.push(profile);
        self.revision += 1;
        self.save()
    }

    /// Set or clear a profile's display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be saved.
    pub fn rename(&mut self, id: &str, name: Option<String>) -> Result<bool> {
        if let Some(profile) = self.profiles.iter_mut().find(|p| p.id == id) {
            profile.name = name;
            self.save()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Remove a profile and its enrollments.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be saved.
    pub fn remove_profile(&mut self, id: &str) -> Result<bool> {
        let len_before = self.profiles.len();
        self.profiles.retain(|p| p.id != id);
        let removed = self.profiles.len() < len_before;
        if removed {
            self.enrollments.retain(|e| e.customer_id != id);
            self.revision += 1;
            self.save()?;
        }
        Ok(removed)
    }

    /// Enroll a customer at a business.
    ///
    /// Enrolling twice returns the existing record unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCustomer`] if the customer is not in the
    /// directory, or an error if the store cannot be saved.
    pub fn enroll(&mut self, customer_id: &str, business_id: &str) -> Result<Enrollment> {
        if self.find_profile(customer_id).is_none() {
            return Err(Error::UnknownCustomer(customer_id.to_string()));
        }

        if let Some(existing) = self.find_enrollment(customer_id, business_id) {
            return Ok(existing.clone());
        }

        let enrollment = Enrollment::new(customer_id, business_id);
        self.enrollments.push(enrollment.clone());
        self.save()?;
        Ok(enrollment)
    }

    /// Remove an enrollment.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be saved.
    pub fn unenroll(&mut self, customer_id: &str, business_id: &str) -> Result<bool> {
        let len_before = self.enrollments.len();
        self.enrollments
            .retain(|e| !(e.customer_id == customer_id && e.business_id == business_id));
        let removed = self.enrollments.len() < len_before;
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Find the enrollment for `(customer_id, business_id)`.
    #[must_use]
    pub fn find_enrollment(&self, customer_id: &str, business_id: &str) -> Option<&Enrollment> {
        self.enrollments
            .iter()
            .find(|e| e.customer_id == customer_id && e.business_id == business_id)
    }

    /// All enrollments of one customer.
    #[must_use]
    pub fn enrollments_for(&self, customer_id: &str) -> Vec<&Enrollment> {
        self.enrollments
            .iter()
            .filter(|e| e.customer_id == customer_id)
            .collect()
    }

    /// Current identifier-set revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[async_trait]
impl CustomerDirectory for JsonStore {
    async fn entries_by_role(&self, role: Role) -> Result<Vec<DirectoryEntry>> {
        Ok(self
            .profiles
            .iter()
            .filter(|p| p.role == role)
            .map(DirectoryEntry::from)
            .collect())
    }

    async fn profile(&self, id: &str) -> Result<Option<CustomerProfile>> {
        Ok(self.find_profile(id).cloned())
    }

    async fn revision(&self) -> Result<Option<u64>> {
        Ok(Some(self.revision))
    }
}

#[async_trait]
impl EnrollmentReader for JsonStore {
    async fn enrollment(
        &self,
        customer_id: &str,
        business_id: &str,
    ) -> Result<Option<Enrollment>> {
        Ok(self.find_enrollment(customer_id, business_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_profile(id: &str) -> CustomerProfile {
        CustomerProfile::customer(id, Some("Test Customer".to_string()))
    }

    #[test]
    fn test_store_save_and_load() {
        let tmp_dir = TempDir::new().unwrap();
        let store_path = tmp_dir.path().join("store.json");

        let mut store = JsonStore::load_from(store_path.clone()).unwrap();
        store.add_profile(create_test_profile("c1")).unwrap();
        store.enroll("c1", "biz-1").unwrap();

        let loaded = JsonStore::load_from(store_path).unwrap();
        assert_eq!(loaded.profiles().len(), 1);
        assert!(loaded.find_enrollment("c1", "biz-1").is_some());
        assert_eq!(loaded.revision(), store.revision());
    }

    #[test]
    fn test_store_never_persists_codes() {
        let tmp_dir = TempDir::new().unwrap();
        let store_path = tmp_dir.path().join("store.json");

        let mut store = JsonStore::load_from(store_path.clone()).unwrap();
        store
            .add_profile(create_test_profile("11111111-1111-1111-1111-111111111111"))
            .unwrap();

        let raw = fs::read_to_string(store_path).unwrap();
        assert!(!raw.contains("SUN-873-VPV"));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let tmp_dir = TempDir::new().unwrap();
        let store = JsonStore::load_from(tmp_dir.path().join("nonexistent.json")).unwrap();
        assert!(store.profiles().is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_load_rejects_newer_version() {
        let tmp_dir = TempDir::new().unwrap();
        let store_path = tmp_dir.path().join("store.json");
        fs::write(&store_path, r#"{"version": 99}"#).unwrap();

        assert!(matches!(
            JsonStore::load_from(store_path),
            Err(Error::StoreError(_))
        ));
    }

    #[test]
    fn test_duplicate_customer_rejected() {
        let tmp_dir = TempDir::new().unwrap();
        let mut store = JsonStore::load_from(tmp_dir.path().join("store.json")).unwrap();
        store.add_profile(create_test_profile("c1")).unwrap();

        assert!(matches!(
            store.add_profile(create_test_profile("c1")),
            Err(Error::DuplicateCustomer(id)) if id == "c1"
        ));
    }

    #[test]
    fn test_enroll_requires_known_customer() {
        let tmp_dir = TempDir::new().unwrap();
        let mut store = JsonStore::load_from(tmp_dir.path().join("store.json")).unwrap();

        assert!(matches!(
            store.enroll("ghost", "biz-1"),
            Err(Error::UnknownCustomer(_))
        ));
    }

    #[test]
    fn test_enroll_is_idempotent() {
        let tmp_dir = TempDir::new().unwrap();
        let mut store = JsonStore::load_from(tmp_dir.path().join("store.json")).unwrap();
        store.add_profile(create_test_profile("c1")).unwrap();

        let first = store.enroll("c1", "biz-1").unwrap();
        let second = store.enroll("c1", "biz-1").unwrap();
        assert_eq!(first, second);
        assert_eq!(store.enrollments_for("c1").len(), 1);
    }

    #[test]
    fn test_remove_profile_drops_enrollments_and_bumps_revision() {
        let tmp_dir = TempDir::new().unwrap();
        let mut store = JsonStore::load_from(tmp_dir.path().join("store.json")).unwrap();
        store.add_profile(create_test_profile("c1")).unwrap();
        store.enroll("c1", "biz-1").unwrap();
        let revision = store.revision();

        assert!(store.remove_profile("c1").unwrap());
        assert!(store.find_enrollment("c1", "biz-1").is_none());
        assert!(store.revision() > revision);
        assert!(!store.remove_profile("c1").unwrap());
    }

    #[test]
    fn test_rename_does_not_bump_revision() {
        let tmp_dir = TempDir::new().unwrap();
        let mut store = JsonStore::load_from(tmp_dir.path().join("store.json")).unwrap();
        store.add_profile(create_test_profile("c1")).unwrap();
        let revision = store.revision();

        assert!(store.rename("c1", None).unwrap());
        assert_eq!(store.revision(), revision);
        assert!(store.find_profile("c1").unwrap().name.is_none());
    }

    #[tokio::test]
    async fn test_directory_trait_filters_roles() {
        let tmp_dir = TempDir::new().unwrap();
        let mut store = JsonStore::load_from(tmp_dir.path().join("store.json")).unwrap();
        store.add_profile(create_test_profile("c1")).unwrap();
        store
            .add_profile(CustomerProfile::customer("b1", None).with_role(Role::Business))
            .unwrap();

        let customers = store.entries_by_role(Role::Customer).await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].id, "c1");
    }
}

//! Operator session.
//!
//! A [`Session`] names the business an operator is acting for. It is passed
//! explicitly to anything that needs the business identifier; the only
//! persistence is [`SessionFile`], which the CLI loads and saves on demand.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Business operator identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Business whose loyalty program is checked
    pub business_id: String,
    /// Free-form operator label (staff name, terminal id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// When the session started
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Start a session for `business_id`.
    #[must_use]
    pub fn new(business_id: impl Into<String>) -> Self {
        Self {
            business_id: business_id.into(),
            operator: None,
            started_at: Utc::now(),
        }
    }

    /// Attach an operator label.
    #[must_use]
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }
}

/// JSON file holding at most one [`Session`].
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    /// Session file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Session file in the platform data directory.
    #[must_use]
    pub fn default_location() -> Self {
        let path = directories::ProjectDirs::from("com", "stampbook", "Stampbook")
            .map_or_else(
                || PathBuf::from("session.json"),
                |dirs| dirs.data_dir().join("session.json"),
            );
        Self::new(path)
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSession`] if nothing is saved, or a serialization
    /// error if the file is corrupt.
    pub fn load(&self) -> Result<Session> {
        if !self.path.exists() {
            return Err(Error::NoSession);
        }
        let content = fs::read_to_string(&self.path)?;
        let session = serde_json::from_str(&content)?;
        Ok(session)
    }

    /// Save `session`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        debug!(business_id = %session.business_id, path = %self.path.display(), "saved session");
        Ok(())
    }

    /// Remove the saved session. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_session() {
        let dir = TempDir::new().unwrap();
        let file = SessionFile::new(dir.path().join("session.json"));
        assert!(matches!(file.load(), Err(Error::NoSession)));
        assert!(!file.clear().unwrap());
    }

    #[test]
    fn test_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let file = SessionFile::new(dir.path().join("nested").join("session.json"));
        let session = Session::new("biz-42").with_operator("front desk");

        file.save(&session).unwrap();
        assert_eq!(file.load().unwrap(), session);

        assert!(file.clear().unwrap());
        assert!(matches!(file.load(), Err(Error::NoSession)));
    }

    #[test]
    fn test_corrupt_session_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{ not json").unwrap();

        let result = SessionFile::new(&path).load();
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_operator_is_optional_on_disk() {
        let json = r#"{"business_id":"biz-1","started_at":"2024-01-01T00:00:00Z"}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.business_id, "biz-1");
        assert!(session.operator.is_none());
    }
}

//! Error types for Stampbook.
//!
//! This module provides a unified error type for all Stampbook operations.
//! Business outcomes of a lookup ("no such code", "not enrolled") are plain
//! values in [`crate::lookup`] and [`crate::verify`]; the variants here that
//! share their names are used where a caller asks for a hard failure, such
//! as the CLI or the web API.

use std::io;

use thiserror::Error;

/// A specialized `Result` type for Stampbook operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Stampbook.
#[derive(Error, Debug)]
pub enum Error {
    /// Code does not have the `LLL-NNN-LLL` shape (E001)
    #[error("invalid code format: {0}")]
    InvalidCodeFormat(String),

    /// Well-formed code that no customer reproduces (E002)
    #[error("no customer found for code '{0}'")]
    CodeNotFound(String),

    /// Customer exists but is not enrolled at the business (E003)
    #[error("customer '{customer_id}' is not enrolled at business '{business_id}'")]
    NotEnrolled {
        /// Resolved customer identifier
        customer_id: String,
        /// Business that was checked
        business_id: String,
    },

    /// Directory or enrollment query failed (E004)
    #[error("directory query failed: {0}")]
    Directory(String),

    /// Operation timeout (E005)
    #[error("operation timed out after {0} seconds")]
    Timeout(u64),

    /// Generator was given an empty identifier
    #[error("customer identifier must not be empty")]
    EmptyIdentifier,

    /// Generator produced something outside the code shape
    #[error("code generation failed for identifier '{0}'")]
    GenerationFailed(String),

    /// Customer already present in the directory
    #[error("customer '{0}' already exists")]
    DuplicateCustomer(String),

    /// Customer not present in the directory
    #[error("customer '{0}' not found in directory")]
    UnknownCustomer(String),

    /// No active operator session
    #[error("no active session, run `stampbook session login` first")]
    NoSession,

    /// Configuration file error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Store file error
    #[error("store error: {0}")]
    StoreError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the error code associated with this error, if any.
    ///
    /// Error codes follow the pattern EXXX where XXX is a 3-digit number.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::InvalidCodeFormat(_) => Some("E001"),
            Self::CodeNotFound(_) => Some("E002"),
            Self::NotEnrolled { .. } => Some("E003"),
            Self::Directory(_) => Some("E004"),
            Self::Timeout(_) => Some("E005"),
            _ => None,
        }
    }

    /// Returns whether this error is recoverable (can be retried).
    ///
    /// Only infrastructure failures qualify; retrying a malformed or unknown
    /// code gives the same answer.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Directory(_) | Self::Timeout(_) | Self::Io(_))
    }

    /// Returns a helpful suggestion for resolving the error, if applicable.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidCodeFormat(_) => {
                Some("Check the code format: three letters, three digits, three letters (ABC-234-XYZ).")
            }
            Self::CodeNotFound(_) => {
                Some("Ask the customer to read the code again or scan their QR code.")
            }
            Self::NotEnrolled { .. } => {
                Some("Ask the customer to join your loyalty program first.")
            }
            Self::Directory(_) | Self::Timeout(_) => {
                Some("The customer directory did not answer. Try again in a moment.")
            }
            Self::NoSession => Some(
                "Log in as a business operator:\n\
                   stampbook session login --business <BUSINESS_ID>",
            ),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::InvalidCodeFormat("x".into()).code(), Some("E001"));
        assert_eq!(Error::CodeNotFound("ZZZ-999-ZZZ".into()).code(), Some("E002"));
        assert_eq!(
            Error::NotEnrolled {
                customer_id: "c".into(),
                business_id: "b".into(),
            }
            .code(),
            Some("E003")
        );
        assert_eq!(Error::Directory("down".into()).code(), Some("E004"));
        assert_eq!(Error::EmptyIdentifier.code(), None);
    }

    #[test]
    fn test_only_infrastructure_is_recoverable() {
        assert!(Error::Directory("connection reset".into()).is_recoverable());
        assert!(Error::Timeout(10).is_recoverable());
        assert!(!Error::CodeNotFound("ABC-234-XYZ".into()).is_recoverable());
        assert!(!Error::InvalidCodeFormat("??".into()).is_recoverable());
    }

    #[test]
    fn test_not_enrolled_message() {
        let err = Error::NotEnrolled {
            customer_id: "cust-1".into(),
            business_id: "biz-42".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("cust-1"));
        assert!(msg.contains("biz-42"));
        assert!(err.suggestion().is_some());
    }
}

//! Enrollment verification.
//!
//! Turns a code typed or scanned at a business into an enrolled customer.
//! One call walks a fixed sequence of stages and stops at the first one
//! that fails:
//!
//! ```text
//! ValidatingFormat -> Resolving -> CheckingProfile -> CheckingEnrollment -> Found
//!        |               |              |                    |
//!   MalformedCode    UnknownCode   NoCustomerProfile     NotEnrolled
//! ```
//!
//! Stages never retry. A failed directory or enrollment query aborts the
//! call with an error instead of being reported as "not found"; callers
//! retry by running the whole pipeline again.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::code::CustomerCode;
use crate::directory::{CustomerDirectory, EnrollmentReader, Role};
use crate::error::{Error, Result};
use crate::lookup::{LookupOutcome, Resolver};

/// Pipeline stage, for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyStage {
    /// Checking the code shape
    ValidatingFormat,
    /// Scanning the directory for the code
    Resolving,
    /// Loading the resolved customer's profile
    CheckingProfile,
    /// Looking for the enrollment row
    CheckingEnrollment,
}

impl std::fmt::Display for VerifyStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ValidatingFormat => "validating format",
            Self::Resolving => "resolving",
            Self::CheckingProfile => "checking profile",
            Self::CheckingEnrollment => "checking enrollment",
        };
        f.write_str(name)
    }
}

/// Why a verification found no enrolled customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NotFoundReason {
    /// The input is not a code
    MalformedCode,
    /// No customer produces this code
    UnknownCode,
    /// The code resolved but the profile is gone or is not a customer
    NoCustomerProfile {
        /// Resolved identifier
        customer_id: String,
    },
    /// The customer exists but has not joined this business's program
    NotEnrolled {
        /// Resolved identifier
        customer_id: String,
        /// Display name, placeholder if the profile has none
        display_name: String,
    },
}

impl NotFoundReason {
    /// Stage at which the pipeline stopped.
    #[must_use]
    pub const fn stage(&self) -> VerifyStage {
        match self {
            Self::MalformedCode => VerifyStage::ValidatingFormat,
            Self::UnknownCode => VerifyStage::Resolving,
            Self::NoCustomerProfile { .. } => VerifyStage::CheckingProfile,
            Self::NotEnrolled { .. } => VerifyStage::CheckingEnrollment,
        }
    }

    /// Message to show the business operator.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::MalformedCode => "Check the code format: it looks like ABC-234-XYZ.",
            Self::UnknownCode => "No customer has this code.",
            Self::NoCustomerProfile { .. } => "This code does not belong to a customer account.",
            Self::NotEnrolled { .. } => {
                "Customer found, but not enrolled here. Ask them to join your program first."
            }
        }
    }

    /// Convert into the matching hard error.
    #[must_use]
    pub fn into_error(self, code: &str, business_id: &str) -> Error {
        match self {
            Self::MalformedCode => Error::InvalidCodeFormat(code.to_string()),
            Self::UnknownCode | Self::NoCustomerProfile { .. } => {
                Error::CodeNotFound(code.to_string())
            }
            Self::NotEnrolled { customer_id, .. } => Error::NotEnrolled {
                customer_id,
                business_id: business_id.to_string(),
            },
        }
    }
}

/// An enrolled customer found by code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrolledCustomer {
    /// Customer identifier
    pub customer_id: String,
    /// Display name, placeholder if the profile has none
    pub display_name: String,
    /// Points balance at this business
    pub points: u64,
}

/// Result of one verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyOutcome {
    /// The code belongs to a customer enrolled at the business
    Found(EnrolledCustomer),
    /// The pipeline stopped early
    NotFound(NotFoundReason),
}

impl VerifyOutcome {
    /// The enrolled customer, if found.
    #[must_use]
    pub fn customer(&self) -> Option<&EnrolledCustomer> {
        match self {
            Self::Found(customer) => Some(customer),
            Self::NotFound(_) => None,
        }
    }

    /// Convert into a `Result`, mapping every not-found reason to an error.
    ///
    /// # Errors
    ///
    /// Returns the error matching the [`NotFoundReason`].
    pub fn into_result(self, code: &str, business_id: &str) -> Result<EnrolledCustomer> {
        match self {
            Self::Found(customer) => Ok(customer),
            Self::NotFound(reason) => Err(reason.into_error(code, business_id)),
        }
    }
}

/// Verifies that a code belongs to a customer enrolled at a business.
#[derive(Clone)]
pub struct EnrollmentVerifier {
    resolver: Resolver,
    enrollments: Arc<dyn EnrollmentReader>,
    placeholder_name: String,
    timeout: Option<Duration>,
}

impl EnrollmentVerifier {
    /// Create a verifier that scans `directory` linearly.
    #[must_use]
    pub fn new(
        directory: Arc<dyn CustomerDirectory>,
        enrollments: Arc<dyn EnrollmentReader>,
    ) -> Self {
        Self::with_resolver(Resolver::new(directory), enrollments)
    }

    /// Create a verifier around an existing resolver.
    #[must_use]
    pub fn with_resolver(resolver: Resolver, enrollments: Arc<dyn EnrollmentReader>) -> Self {
        Self {
            resolver,
            enrollments,
            placeholder_name: crate::DEFAULT_DISPLAY_NAME.to_string(),
            timeout: None,
        }
    }

    /// Display name used for customers without one.
    #[must_use]
    pub fn with_placeholder_name(mut self, name: impl Into<String>) -> Self {
        self.placeholder_name = name.into();
        self
    }

    /// The resolver used for the lookup stage.
    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Bound each verification by `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Find the customer behind `code` and confirm they are enrolled at
    /// `business_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or enrollment query fails, or if the
    /// configured timeout elapses. Every business outcome is a
    /// [`VerifyOutcome`].
    pub async fn find_enrolled_customer(
        &self,
        code: &str,
        business_id: &str,
    ) -> Result<VerifyOutcome> {
        let run = self.run(code, business_id);
        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| Error::Timeout(limit.as_secs()))??,
            None => run.await?,
        };

        match &outcome {
            VerifyOutcome::Found(customer) => {
                info!(
                    customer_id = %customer.customer_id,
                    business_id,
                    "verified enrolled customer"
                );
            }
            VerifyOutcome::NotFound(reason) => {
                info!(
                    business_id,
                    stage = %reason.stage(),
                    "verification stopped: {}",
                    reason.message()
                );
            }
        }

        Ok(outcome)
    }

    async fn run(&self, code: &str, business_id: &str) -> Result<VerifyOutcome> {
        debug!(stage = %VerifyStage::ValidatingFormat, input = code, "verification stage");
        let Ok(target) = CustomerCode::parse(code) else {
            return Ok(VerifyOutcome::NotFound(NotFoundReason::MalformedCode));
        };

        debug!(stage = %VerifyStage::Resolving, code = %target, "verification stage");
        let customer_id = match self.resolver.resolve(target.as_str()).await? {
            LookupOutcome::Found(id) => id,
            LookupOutcome::NotFound => {
                return Ok(VerifyOutcome::NotFound(NotFoundReason::UnknownCode));
            }
            LookupOutcome::Malformed => {
                return Ok(VerifyOutcome::NotFound(NotFoundReason::MalformedCode));
            }
        };

        debug!(stage = %VerifyStage::CheckingProfile, customer_id = %customer_id, "verification stage");
        let profile = match self.resolver.directory().profile(&customer_id).await? {
            Some(profile) if profile.role == Role::Customer => profile,
            _ => {
                return Ok(VerifyOutcome::NotFound(NotFoundReason::NoCustomerProfile {
                    customer_id,
                }));
            }
        };
        let display_name = profile
            .display_name_or(&self.placeholder_name)
            .to_string();

        debug!(
            stage = %VerifyStage::CheckingEnrollment,
            customer_id = %customer_id,
            business_id,
            "verification stage"
        );
        let Some(enrollment) = self
            .enrollments
            .enrollment(&customer_id, business_id)
            .await?
        else {
            return Ok(VerifyOutcome::NotFound(NotFoundReason::NotEnrolled {
                customer_id,
                display_name,
            }));
        };

        Ok(VerifyOutcome::Found(EnrolledCustomer {
            customer_id,
            display_name,
            points: enrollment.points,
        }))
    }
}

impl std::fmt::Debug for EnrollmentVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrollmentVerifier")
            .field("resolver", &self.resolver)
            .field("placeholder_name", &self.placeholder_name)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

//! Shared state for web handlers.

use std::sync::Arc;

use crate::lookup::Resolver;
use crate::qr::QrConfig;
use crate::verify::EnrollmentVerifier;

/// State shared by every request.
#[derive(Debug)]
pub struct AppState {
    /// Verification pipeline; its resolver also serves `/api/resolve`
    pub verifier: EnrollmentVerifier,
    /// Deep link settings for rendered QR codes
    pub qr: QrConfig,
}

impl AppState {
    /// Create state around a verifier.
    #[must_use]
    pub fn new(verifier: EnrollmentVerifier) -> Self {
        Self {
            verifier,
            qr: QrConfig::default(),
        }
    }

    /// Use `qr` for rendered deep links.
    #[must_use]
    pub fn with_qr_config(mut self, qr: QrConfig) -> Self {
        self.qr = qr;
        self
    }

    /// The resolver shared with the verifier.
    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        self.verifier.resolver()
    }
}

/// Handle passed to axum.
pub type SharedState = Arc<AppState>;

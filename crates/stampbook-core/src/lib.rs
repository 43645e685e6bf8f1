//! # Stampbook Core Library
//!
//! `stampbook-core` provides the customer-code subsystem behind Stampbook,
//! a loyalty-rewards application where customers collect points at
//! businesses by showing a QR code or reading out a short code.
//!
//! ## Features
//!
//! - **Deterministic codes**: every customer identifier maps to one
//!   `LLL-NNN-LLL` code, forever, without storing it anywhere
//! - **Reverse lookup**: codes are resolved by regenerating them over the
//!   customer directory
//! - **Enrollment verification**: a resolved customer is checked against
//!   the business's loyalty program
//! - **Storage agnostic**: directory and enrollment access go through traits
//!
//! ## Modules
//!
//! - [`code`] - Code alphabet, generation, validation and input formatting
//! - [`config`] - Configuration management
//! - [`diagnostics`] - Consistency harness, golden vectors and collision reports
//! - [`directory`] - Customer directory and enrollment reader traits
//! - [`lookup`] - Reverse lookup from code to customer identifier
//! - [`qr`] - QR rendering of customer codes
//! - [`session`] - Explicit operator session passed to handlers
//! - [`store`] - JSON file backed directory and enrollment table
//! - [`verify`] - Enrollment verification pipeline
//! - [`web`] - HTTP API (feature `web`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use stampbook_core::code::CodeGenerator;
//! use stampbook_core::verify::EnrollmentVerifier;
//!
//! let code = CodeGenerator::new().generate("11111111-1111-1111-1111-111111111111")?;
//! println!("Customer code: {code}");
//!
//! let verifier = EnrollmentVerifier::new(directory, enrollments);
//! let outcome = verifier.find_enrolled_customer("sun-873-vpv", "biz-42").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::must_use_candidate)]

pub mod code;
pub mod config;
pub mod diagnostics;
pub mod directory;
pub mod error;
pub mod lookup;
pub mod qr;
pub mod session;
pub mod store;
pub mod verify;

#[cfg(feature = "web")]
pub mod web;

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Display name used when a customer profile has no name set
pub const DEFAULT_DISPLAY_NAME: &str = "Customer";

/// Default web API port
pub const DEFAULT_WEB_PORT: u16 = 8787;

/// Default timeout for one verification pipeline, in seconds
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Directory size from which the reverse-index cache is built
pub const DEFAULT_CACHE_THRESHOLD: usize = 200;

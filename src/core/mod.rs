//! Core types for halform
//!
//! This module holds the error type shared by every other module and the
//! reporting helpers used by the CLI.
//!
//! # Error Management
//!
//! - **Strongly-typed errors** ([`HalError`]) for precise error handling in code
//! - **User-friendly contexts** ([`ErrorContext`]) with actionable suggestions for CLI users
//! - **Automatic error conversion** from I/O, JSON, TOML and template errors
//!
//! Library operations return [`Result`], which defaults its error type to
//! [`HalError`]. User-supplied hooks return `anyhow::Result`; the engine wraps
//! their failures into [`HalError::PrepareFailure`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use halform::core::{HalError, ErrorContext};
//!
//! fn create_helpful_error() -> ErrorContext {
//!     ErrorContext::new(HalError::UnresolvedNamespace { rel: "mco:badRel".into() })
//!         .with_suggestion("Register the 'mco' namespace before serving requests")
//! }
//!
//! create_helpful_error().display();
//! ```

pub mod error;

pub use error::{ErrorContext, HalError, Result, closest_field, user_friendly_error};

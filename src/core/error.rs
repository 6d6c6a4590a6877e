//! Error handling for halform
//!
//! This module provides the typed error enum used across the engine and the
//! user-facing reporting helpers used by the CLI. The error system follows two
//! principles:
//! 1. **Strongly-typed errors** so callers (and tests) can match on the exact
//!    failure kind
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Configuration time**: [`HalError::Validation`], [`HalError::ConflictingHalConfig`],
//!   [`HalError::ConfigError`]. Raised synchronously when namespaces, rels or routes
//!   are registered.
//! - **Route resolution**: [`HalError::MissingRouteParameter`], [`HalError::RouteNotFound`].
//! - **Request time**: [`HalError::PrepareFailure`], [`HalError::UnresolvedNamespace`],
//!   [`HalError::EmbedDepthExceeded`]. These abort a single representation build and
//!   never touch the namespace registry.
//! - **Documentation**: [`HalError::RelDocNotFound`], [`HalError::TemplateError`].
//! - **Ambient**: [`HalError::IoError`], [`HalError::JsonError`], [`HalError::TomlError`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use halform::core::{HalError, ErrorContext, user_friendly_error};
//!
//! let error = HalError::MissingRouteParameter {
//!     route: "person".to_string(),
//!     parameter: "id".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use strsim::levenshtein;
use thiserror::Error;

/// Result alias used by every library operation.
pub type Result<T, E = HalError> = std::result::Result<T, E>;

/// Fields accepted in a namespace registration spec.
pub const NAMESPACE_FIELDS: &[&str] = &["name", "prefix", "dir"];

/// The main error type for halform operations
///
/// Each variant describes one failure mode precisely enough for callers to
/// react to it. Variants carry owned strings so the error is cheap to clone and
/// can be reported after the build that produced it is gone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HalError {
    /// Namespace or rel registration failed validation
    ///
    /// Raised for unexpected keys, missing required keys, empty values and
    /// duplicate names or prefixes.
    ///
    /// # Fields
    /// - `field`: the first offending field
    /// - `message`: a human readable description, e.g. `"prefirx" is not allowed`
    #[error("{message}")]
    Validation {
        /// The first offending field
        field: String,
        /// Description of the violation
        message: String,
    },

    /// A named route was resolved without one of its required path parameters
    #[error("Missing parameter '{parameter}' for route '{route}'")]
    MissingRouteParameter {
        /// The route identifier being resolved
        route: String,
        /// The required path token that had no value
        parameter: String,
    },

    /// No route is registered under the requested identifier
    #[error("Route not found: {route}")]
    RouteNotFound {
        /// The route identifier that was looked up
        route: String,
    },

    /// A route declares both a HAL configuration object and a HAL function
    #[error("Route '{route}' declares both a hal configuration and a hal function")]
    ConflictingHalConfig {
        /// The route carrying both declarations
        route: String,
    },

    /// A user-supplied hook or link function failed
    ///
    /// Aborts the whole representation build. The host should answer the
    /// request with a server error.
    #[error("Prepare hook failed during {stage}: {message}")]
    PrepareFailure {
        /// Where the hook was running (e.g. "route prepare", "embedded 'mco:boss' href")
        stage: String,
        /// The hook's error, including its context chain
        message: String,
    },

    /// Strict mode found a namespace-qualified rel without a registered namespace or rel
    #[error("Unresolved namespace-qualified rel: {rel}")]
    UnresolvedNamespace {
        /// The offending rel, e.g. "mco:badRel"
        rel: String,
    },

    /// Embedded configuration nested deeper than the engine allows
    #[error("Embedded resources nested deeper than {depth} levels")]
    EmbedDepthExceeded {
        /// The depth limit that was hit
        depth: usize,
    },

    /// No documentation is available for the requested rel
    #[error("No documentation for rel '{rel}' in namespace '{namespace}'")]
    RelDocNotFound {
        /// Namespace name from the documentation path
        namespace: String,
        /// Rel name from the documentation path
        rel: String,
    },

    /// Configuration file or settings problem
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Rel documentation template failed to render
    #[error("Template error: {message}")]
    TemplateError {
        /// The renderer's message
        message: String,
    },

    /// I/O error while loading rels or configuration
    #[error("IO error: {message}")]
    IoError {
        /// The underlying error kind
        kind: std::io::ErrorKind,
        /// The underlying error message
        message: String,
    },

    /// JSON (de)serialisation error
    #[error("JSON error: {message}")]
    JsonError {
        /// The parser's message
        message: String,
    },

    /// TOML parsing error
    #[error("TOML parsing error: {message}")]
    TomlError {
        /// The parser's message
        message: String,
    },
}

impl HalError {
    /// Build a [`HalError::Validation`] for `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build a [`HalError::PrepareFailure`] from a hook's `anyhow` error.
    pub fn prepare_failure(stage: impl Into<String>, error: &anyhow::Error) -> Self {
        Self::PrepareFailure {
            stage: stage.into(),
            message: format!("{error:#}"),
        }
    }

    /// Whether this error belongs to a single request and should become a 500 reply.
    #[must_use]
    pub const fn is_request_failure(&self) -> bool {
        matches!(
            self,
            Self::PrepareFailure { .. }
                | Self::UnresolvedNamespace { .. }
                | Self::EmbedDepthExceeded { .. }
                | Self::MissingRouteParameter { .. }
                | Self::RouteNotFound { .. }
        )
    }
}

impl From<std::io::Error> for HalError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for HalError {
    fn from(error: serde_json::Error) -> Self {
        Self::JsonError {
            message: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for HalError {
    fn from(error: toml::de::Error) -> Self {
        Self::TomlError {
            message: error.to_string(),
        }
    }
}

impl From<tera::Error> for HalError {
    fn from(error: tera::Error) -> Self {
        // tera keeps the useful part of the message in the source chain
        let mut message = error.to_string();
        let mut source = std::error::Error::source(&error);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::TemplateError {
            message,
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Pairs a [`HalError`] with optional details and a suggestion. The CLI uses
/// [`ErrorContext::display`] to print all three with terminal colors.
///
/// # Examples
///
/// ```rust,no_run
/// use halform::core::{HalError, ErrorContext};
///
/// let context = ErrorContext::new(HalError::RouteNotFound { route: "person".into() })
///     .with_suggestion("Check the route ids declared in halform.toml")
///     .with_details("Named routes are looked up by id");
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: HalError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: HalError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Find the allowed field closest to `field`, if it is a plausible typo.
///
/// Used to turn `"prefirx" is not allowed` into a "did you mean 'prefix'?" hint.
#[must_use]
pub fn closest_field<'a>(field: &str, allowed: &[&'a str]) -> Option<&'a str> {
    allowed
        .iter()
        .map(|candidate| (levenshtein(field, candidate), *candidate))
        .filter(|(distance, candidate)| *distance <= candidate.len().max(field.len()) / 2)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognises [`HalError`] variants (with tailored suggestions) and falls back
/// to a generic context carrying the whole `anyhow` chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(hal_error) = error.downcast_ref::<HalError>() {
        return create_error_context(hal_error);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::NotFound {
            return ErrorContext::new(HalError::IoError {
                kind: io_error.kind(),
                message: format!("{error:#}"),
            })
            .with_suggestion("Check that the file or directory exists and the path is correct");
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(HalError::ConfigError {
        message,
    })
}

fn create_error_context(error: &HalError) -> ErrorContext {
    let context = ErrorContext::new(error.clone());
    match error {
        HalError::Validation {
            field,
            message,
        } if message.ends_with("is not allowed") => {
            match closest_field(field, NAMESPACE_FIELDS) {
                Some(candidate) => context
                    .with_suggestion(format!("Did you mean '{candidate}'?"))
                    .with_details("Namespaces accept only 'name' or 'dir', plus 'prefix'"),
                None => context.with_details("Namespaces accept only 'name' or 'dir', plus 'prefix'"),
            }
        }

        HalError::Validation {
            ..
        } => context.with_suggestion(
            "Each namespace needs a unique name (or dir) and a unique prefix",
        ),

        HalError::MissingRouteParameter {
            route,
            parameter,
        } => context
            .with_suggestion(format!("Pass a value for '{parameter}' when resolving route '{route}'"))
            .with_details("Required path tokens look like {name}; optional ones like {name?}"),

        HalError::RouteNotFound {
            route,
        } => context
            .with_suggestion(format!("Declare a route with id = \"{route}\" in halform.toml"))
            .with_details("Named routes are looked up by their id"),

        HalError::ConflictingHalConfig {
            ..
        } => context.with_suggestion("Move the hal function into the configuration's prepare hook"),

        HalError::UnresolvedNamespace {
            rel,
        } => {
            let prefix = rel.split(':').next().unwrap_or(rel);
            context
                .with_suggestion(format!(
                    "Register namespace prefix '{prefix}' and its rel, or disable strict mode"
                ))
                .with_details("Strict mode rejects rels that cannot be resolved to a registered namespace")
        }

        HalError::EmbedDepthExceeded {
            ..
        } => context.with_details("Embedded configuration is applied recursively; check for runaway nesting"),

        HalError::TomlError {
            ..
        } => context
            .with_suggestion("Check the TOML syntax in halform.toml. Verify quotes, brackets, and indentation"),

        _ => context,
    }
}

//! Engine-wide settings.

use crate::constants::{
    DEFAULT_API_PATH, DEFAULT_REL_DOC_BASE, ENV_ABSOLUTE, ENV_HOST, ENV_PROTOCOL, HAL_MEDIA_TYPE,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settings shared by every route.
///
/// ```toml
/// [settings]
/// absolute = true
/// host = "localhost:9090"
/// media_types = ["application/hal+json", "application/json"]
/// require_explicit_hal_accept = false
/// strict = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Render absolute links for every route
    pub absolute: bool,
    /// Protocol of absolute links; defaults to the request's
    pub protocol: Option<String>,
    /// `host[:port]` of absolute links; defaults to the request's
    pub host: Option<String>,
    /// Media types the engine produces, in preference order
    pub media_types: Vec<String>,
    /// Only transform when the client names one of `media_types` explicitly
    pub require_explicit_hal_accept: bool,
    /// Fail builds referencing unregistered namespaces or rels
    pub strict: bool,
    /// Base path of rel documentation and curie hrefs
    pub rel_doc_base: String,
    /// Path of the API root document
    pub api_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            absolute: false,
            protocol: None,
            host: None,
            media_types: vec![HAL_MEDIA_TYPE.to_string()],
            require_explicit_hal_accept: false,
            strict: false,
            rel_doc_base: DEFAULT_REL_DOC_BASE.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
        }
    }
}

impl Settings {
    /// Apply the `HALFORM_PROTOCOL`, `HALFORM_HOST` and `HALFORM_ABSOLUTE`
    /// environment overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(protocol) = var(ENV_PROTOCOL).filter(|v| !v.is_empty()) {
            debug!("Protocol overridden by {}: {}", ENV_PROTOCOL, protocol);
            self.protocol = Some(protocol);
        }
        if let Some(host) = var(ENV_HOST).filter(|v| !v.is_empty()) {
            debug!("Host overridden by {}: {}", ENV_HOST, host);
            self.host = Some(host);
        }
        if let Some(absolute) = var(ENV_ABSOLUTE) {
            self.absolute = matches!(absolute.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        self
    }
}

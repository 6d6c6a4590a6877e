//! The `halform.toml` file format.
//!
//! ```toml
//! [settings]
//! strict = true
//!
//! [[namespaces]]
//! name = "mycompany"
//! prefix = "mco"
//! rels = ["boss", { name = "person", description = "A person" }]
//!
//! [[namespaces]]
//! dir = "rels/mycompany"
//! prefix = "docs"
//!
//! [[routes]]
//! path = "/people/{id}"
//! id = "person"
//!
//! [routes.hal]
//! query = "{?full}"
//! api = "mco:person"
//! links = { "mco:boss" = { href = "../{bossId}", title = "Boss" } }
//! ```
//!
//! Namespace entries and route `hal` tables are transcoded to JSON and go
//! through the same validation as programmatic JSON configuration.

use crate::config::Settings;
use crate::core::{HalError, Result};
use crate::hal::HalConfig;
use crate::namespace::{NamespaceSpec, RelDefinition};
use crate::route::RouteEntry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

fn default_method() -> String {
    "GET".to_string()
}

/// A route declared in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// Request method, `*` for any
    #[serde(default = "default_method")]
    pub method: String,
    /// Path pattern, e.g. `/people/{id}`
    pub path: String,
    /// Route identifier for named-route resolution
    #[serde(default)]
    pub id: Option<String>,
    /// Internal routes are never transformed
    #[serde(default)]
    pub internal: bool,
    /// HAL configuration table
    #[serde(default)]
    pub hal: Option<toml::Table>,
}

impl RouteConfig {
    /// Build the route entry, validating the `hal` table.
    pub fn to_entry(&self) -> Result<RouteEntry> {
        let mut entry = RouteEntry::new(&self.method, &self.path)?.internal(self.internal);
        if let Some(id) = &self.id {
            entry = entry.id(id.clone());
        }
        if let Some(hal) = &self.hal {
            entry = entry.hal(HalConfig::from_value(&serde_json::to_value(hal)?)?);
        }
        Ok(entry)
    }
}

/// A namespace declaration with its inline rels.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDecl {
    /// Validated namespace spec; `dir` resolved against the config file
    pub spec: NamespaceSpec,
    /// Rels declared inline
    pub rels: Vec<RelDefinition>,
}

/// Contents of a `halform.toml` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Engine settings
    pub settings: Settings,
    /// Namespace tables: `name` or `dir`, `prefix`, and optional `rels`
    pub namespaces: Vec<toml::Table>,
    /// Route declarations
    pub routes: Vec<RouteConfig>,
}

impl EngineConfig {
    /// Load a configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        super::parse_config(path)
    }

    /// Parse configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validated namespace declarations, with relative `dir` paths resolved
    /// against `base_dir`.
    pub fn namespace_decls(&self, base_dir: &Path) -> Result<Vec<NamespaceDecl>> {
        self.namespaces
            .iter()
            .map(|table| {
                let mut table = table.clone();
                let rels = match table.remove("rels") {
                    Some(rels) => parse_rels(&serde_json::to_value(rels)?)?,
                    None => Vec::new(),
                };

                let mut spec = NamespaceSpec::from_value(&serde_json::to_value(&table)?)?;
                if let Some(dir) = spec.dir.take() {
                    spec.dir = Some(if dir.is_relative() { base_dir.join(dir) } else { dir });
                }
                Ok(NamespaceDecl {
                    spec,
                    rels,
                })
            })
            .collect()
    }

    /// Route entries in declaration order.
    pub fn route_entries(&self) -> Result<Vec<RouteEntry>> {
        self.routes.iter().map(RouteConfig::to_entry).collect()
    }
}

fn parse_rels(value: &Value) -> Result<Vec<RelDefinition>> {
    value
        .as_array()
        .ok_or_else(|| HalError::validation("rels", "\"rels\" must be an array"))?
        .iter()
        .map(RelDefinition::from_value)
        .collect()
}

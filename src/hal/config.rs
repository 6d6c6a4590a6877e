//! Per-route HAL configuration.
//!
//! A route's HAL configuration declares the links and embedded resources of
//! its replies. It can be built programmatically or parsed from JSON (and
//! TOML, which is transcoded to JSON first):
//!
//! ```json
//! {
//!   "query": "{?q*,start,limit}",
//!   "links": { "mco:boss": { "href": "../{bossId}", "title": "Boss" } },
//!   "embedded": {
//!     "mco:person": { "path": "items", "href": "./{item.id}" }
//!   }
//! }
//! ```
//!
//! Declaration order of `links` and `embedded` is preserved and determines the
//! order of the rendered document.

use crate::core::{HalError, Result};
use crate::hal::hooks::PrepareHook;
use crate::hal::link::LinkSpec;
use serde_json::{Map, Value};

const HAL_FIELDS: &[&str] = &["name", "links", "embedded", "query", "absolute", "api", "ignore"];
const EMBED_FIELDS: &[&str] = &["path", "href", "links", "embedded", "collection"];

/// HAL configuration of one route.
#[derive(Debug, Clone, Default)]
pub struct HalConfig {
    /// Symbolic route name used by named-route resolution
    pub name: Option<String>,
    /// Links in declaration order
    pub links: Vec<(String, LinkSpec)>,
    /// Embedded resources in declaration order
    pub embedded: Vec<(String, EmbedSpec)>,
    /// Hook run after links and embedded resources are resolved
    pub prepare: Option<PrepareHook>,
    /// Query template, e.g. `{?q*,start,limit}`
    pub query: Option<String>,
    /// Render absolute links for this route
    pub absolute: bool,
    /// Rel under which the route appears in the API root document
    pub api: Option<String>,
    /// Payload fields omitted from the document
    pub ignore: Vec<String>,
}

impl HalConfig {
    /// An empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the route name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a link.
    #[must_use]
    pub fn link(mut self, rel: impl Into<String>, spec: impl Into<LinkSpec>) -> Self {
        self.links.push((rel.into(), spec.into()));
        self
    }

    /// Add an embedded resource.
    #[must_use]
    pub fn embed(mut self, rel: impl Into<String>, spec: EmbedSpec) -> Self {
        self.embedded.push((rel.into(), spec));
        self
    }

    /// Set the prepare hook.
    #[must_use]
    pub fn prepare(mut self, hook: PrepareHook) -> Self {
        self.prepare = Some(hook);
        self
    }

    /// Set the query template.
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Render absolute links for this route.
    #[must_use]
    pub fn absolute(mut self, absolute: bool) -> Self {
        self.absolute = absolute;
        self
    }

    /// List the route in the API root document under `rel`.
    #[must_use]
    pub fn api(mut self, rel: impl Into<String>) -> Self {
        self.api = Some(rel.into());
        self
    }

    /// Omit payload fields from the document.
    #[must_use]
    pub fn ignore<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Parse a configuration object.
    ///
    /// Hooks cannot be expressed as data; attach them with
    /// [`HalConfig::prepare`] after parsing.
    ///
    /// # Errors
    ///
    /// [`HalError::Validation`] naming the first unknown or malformed field.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = as_object(value, "hal")?;
        check_fields(map, HAL_FIELDS)?;

        let mut config = Self {
            name: optional_string(map, "name")?,
            query: optional_string(map, "query")?,
            api: optional_string(map, "api")?,
            absolute: optional_bool(map, "absolute")?,
            ..Self::default()
        };

        if let Some(links) = map.get("links") {
            config.links = parse_links(links)?;
        }
        if let Some(embedded) = map.get("embedded") {
            config.embedded = parse_embedded(embedded)?;
        }
        if let Some(ignore) = map.get("ignore") {
            config.ignore = parse_ignore(ignore)?;
        }
        Ok(config)
    }
}

/// Configuration of one embedded resource.
#[derive(Debug, Clone)]
pub struct EmbedSpec {
    /// Dot-path of the embedded value in the parent entity
    pub path: String,
    /// Self href of each embedded representation
    pub href: LinkSpec,
    /// Links of each embedded representation
    pub links: Vec<(String, LinkSpec)>,
    /// Nested embedded resources
    pub embedded: Vec<(String, EmbedSpec)>,
    /// Hook run on each embedded representation before it is attached
    pub prepare: Option<PrepareHook>,
    /// Render a single object as a one-element array
    pub collection: bool,
}

impl EmbedSpec {
    /// Embed the value at `path` with self href `href`.
    pub fn new(path: impl Into<String>, href: impl Into<LinkSpec>) -> Self {
        Self {
            path: path.into(),
            href: href.into(),
            links: Vec::new(),
            embedded: Vec::new(),
            prepare: None,
            collection: false,
        }
    }

    /// Add a link to each embedded representation.
    #[must_use]
    pub fn link(mut self, rel: impl Into<String>, spec: impl Into<LinkSpec>) -> Self {
        self.links.push((rel.into(), spec.into()));
        self
    }

    /// Add a nested embedded resource.
    #[must_use]
    pub fn embed(mut self, rel: impl Into<String>, spec: EmbedSpec) -> Self {
        self.embedded.push((rel.into(), spec));
        self
    }

    /// Set the prepare hook.
    #[must_use]
    pub fn prepare(mut self, hook: PrepareHook) -> Self {
        self.prepare = Some(hook);
        self
    }

    /// Always render as an array.
    #[must_use]
    pub fn collection(mut self, collection: bool) -> Self {
        self.collection = collection;
        self
    }

    /// Parse an embedded resource object.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = as_object(value, "embedded")?;
        check_fields(map, EMBED_FIELDS)?;

        let path = optional_string(map, "path")?
            .ok_or_else(|| HalError::validation("path", "\"path\" is required"))?;
        let href = map
            .get("href")
            .ok_or_else(|| HalError::validation("href", "\"href\" is required"))
            .and_then(LinkSpec::from_value)?;

        let mut spec = Self::new(path, href).collection(optional_bool(map, "collection")?);
        if let Some(links) = map.get("links") {
            spec.links = parse_links(links)?;
        }
        if let Some(embedded) = map.get("embedded") {
            spec.embedded = parse_embedded(embedded)?;
        }
        Ok(spec)
    }
}

fn as_object<'a>(value: &'a Value, field: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| HalError::validation(field, format!("\"{field}\" must be an object")))
}

fn check_fields(map: &Map<String, Value>, allowed: &[&str]) -> Result<()> {
    for key in map.keys() {
        if key == "prepare" {
            return Err(HalError::validation(
                "prepare",
                "\"prepare\" must be attached programmatically",
            ));
        }
        if !allowed.contains(&key.as_str()) {
            return Err(HalError::validation(key.as_str(), format!("\"{key}\" is not allowed")));
        }
    }
    Ok(())
}

fn optional_string(map: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(HalError::validation(field, format!("\"{field}\" must be a string"))),
    }
}

fn optional_bool(map: &Map<String, Value>, field: &str) -> Result<bool> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(HalError::validation(field, format!("\"{field}\" must be a boolean"))),
    }
}

fn parse_links(value: &Value) -> Result<Vec<(String, LinkSpec)>> {
    as_object(value, "links")?
        .iter()
        .map(|(rel, spec)| LinkSpec::from_value(spec).map(|spec| (rel.clone(), spec)))
        .collect()
}

fn parse_embedded(value: &Value) -> Result<Vec<(String, EmbedSpec)>> {
    as_object(value, "embedded")?
        .iter()
        .map(|(rel, spec)| EmbedSpec::from_value(spec).map(|spec| (rel.clone(), spec)))
        .collect()
}

fn parse_ignore(value: &Value) -> Result<Vec<String>> {
    let invalid = || HalError::validation("ignore", "\"ignore\" must be an array of strings");
    match value {
        Value::String(field) => Ok(vec![field.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

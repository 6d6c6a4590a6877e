//! Link-relation namespaces and the cross-namespace rel index.
//!
//! A [`Namespace`] groups rel definitions under a unique `name` and a unique
//! curie `prefix`. Namespaces live in a [`NamespaceRegistry`] owned by one engine
//! instance; there is no process-global registry, so independent engines never
//! collide.
//!
//! # Registration
//!
//! Namespaces are registered either by name (`{ name, prefix }`) or from a
//! directory of rel documentation files (`{ dir, prefix }`), in which case the
//! injected [`RelLoader`] produces one rel per file. Registration is validated
//! before any I/O: unknown keys, missing keys, empty values and duplicate names
//! or prefixes all fail with [`HalError::Validation`] naming the first offending
//! field.
//!
//! ```rust,no_run
//! use halform::namespace::{NamespaceRegistry, NamespaceSpec};
//!
//! # fn example() -> halform::core::Result<()> {
//! let registry = NamespaceRegistry::new();
//! registry
//!     .add(NamespaceSpec::named("mycompany", "mco"))?
//!     .rel("boss")?
//!     .rel(("datasources", "A list of datasources"))?;
//!
//! let rel = registry.lookup("mco:boss").expect("registered above");
//! assert_eq!(rel.name, "boss");
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! The registry is copy-on-write: readers take an immutable [`RegistrySnapshot`]
//! and keep a consistent view for as long as they hold it, while writers clone
//! the state (only when snapshots are outstanding), mutate the copy and swap it
//! in under a write lock. Writers never corrupt an in-flight reader's view.

mod docs;
mod loader;

pub use docs::{RelDocRenderer, doc_path};
pub use loader::{DirectoryRelLoader, RelDocument, RelLoader};

use crate::core::error::NAMESPACE_FIELDS;
use crate::core::{HalError, Result};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// A single link relation owned by a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelDefinition {
    /// Rel name, unique within its namespace
    pub name: String,
    /// Human readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RelDefinition {
    /// Create a rel with no description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parse a rel from configuration: either a bare string or `{ name, description? }`.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(name) => Ok(Self::new(name.as_str())),
            Value::Object(map) => {
                for key in map.keys() {
                    if key != "name" && key != "description" {
                        return Err(HalError::validation(
                            key.as_str(),
                            format!("\"{key}\" is not allowed"),
                        ));
                    }
                }
                let name = required_string(map.get("name"), "name")?;
                let description = match map.get("description") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(text)) => Some(text.clone()),
                    Some(_) => {
                        return Err(HalError::validation(
                            "description",
                            "\"description\" must be a string",
                        ));
                    }
                };
                Ok(Self {
                    name,
                    description,
                })
            }
            _ => Err(HalError::validation("rel", "\"rel\" must be a string or an object")),
        }
    }
}

impl From<&str> for RelDefinition {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for RelDefinition {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<(&str, &str)> for RelDefinition {
    fn from((name, description): (&str, &str)) -> Self {
        Self::new(name).with_description(description)
    }
}

/// A named group of rels with a unique curie prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Namespace {
    name: String,
    prefix: String,
    #[serde(skip)]
    dir: Option<PathBuf>,
    rels: Vec<RelDefinition>,
}

impl Namespace {
    /// Namespace name (used in rel documentation paths)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Curie prefix (used in qualified rels, e.g. `mco:boss`)
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Documentation directory for directory-style namespaces
    #[must_use]
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Rels in registration order
    #[must_use]
    pub fn rels(&self) -> &[RelDefinition] {
        &self.rels
    }

    /// Look up a rel by its unqualified name.
    #[must_use]
    pub fn rel(&self, name: &str) -> Option<&RelDefinition> {
        self.rels.iter().find(|rel| rel.name == name)
    }

    fn upsert_rel(&mut self, rel: RelDefinition) {
        match self.rels.iter_mut().find(|existing| existing.name == rel.name) {
            Some(existing) => *existing = rel,
            None => self.rels.push(rel),
        }
    }
}

/// Validated input for [`NamespaceRegistry::add`].
///
/// Exactly one of `name` or `dir` must be present; when only `dir` is given the
/// namespace is named after the directory's last component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceSpec {
    /// Namespace name
    pub name: Option<String>,
    /// Directory of rel documentation files
    pub dir: Option<PathBuf>,
    /// Curie prefix
    pub prefix: String,
}

impl NamespaceSpec {
    /// A namespace declared by name.
    pub fn named(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            dir: None,
            prefix: prefix.into(),
        }
    }

    /// A namespace loaded from a directory of rel documentation files.
    pub fn dir(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            name: None,
            dir: Some(dir.into()),
            prefix: prefix.into(),
        }
    }

    /// Parse and validate an untyped spec, e.g. from JSON or a config file.
    ///
    /// Keys are checked in document order, so the error names the first
    /// offending field.
    ///
    /// # Errors
    ///
    /// [`HalError::Validation`] when the value is not an object, has keys other
    /// than `name`, `dir` and `prefix`, has non-string values, or lacks
    /// `prefix`, or do not have exactly one of `name`/`dir`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| HalError::validation("namespace", "\"namespace\" must be an object"))?;

        for key in map.keys() {
            if !NAMESPACE_FIELDS.contains(&key.as_str()) {
                return Err(HalError::validation(key.as_str(), format!("\"{key}\" is not allowed")));
            }
        }

        let name = optional_string(map.get("name"), "name")?;
        let dir = optional_string(map.get("dir"), "dir")?.map(PathBuf::from);
        let prefix = required_string(map.get("prefix"), "prefix")?;

        let spec = Self {
            name,
            dir,
            prefix,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the structural rules that typed construction cannot enforce.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_none() && self.dir.is_none() {
            return Err(HalError::validation("name", "\"name\" is required"));
        }
        if self.name.is_some() && self.dir.is_some() {
            return Err(HalError::validation(
                "dir",
                "\"dir\" is not allowed together with \"name\"",
            ));
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(HalError::validation("name", "\"name\" is not allowed to be empty"));
            }
        }
        if let Some(dir) = &self.dir {
            if dir.as_os_str().is_empty() {
                return Err(HalError::validation("dir", "\"dir\" is not allowed to be empty"));
            }
        }
        if self.prefix.trim().is_empty() {
            return Err(HalError::validation("prefix", "\"prefix\" is not allowed to be empty"));
        }
        if self.prefix.contains(':') {
            return Err(HalError::validation("prefix", "\"prefix\" must not contain ':'"));
        }
        Ok(())
    }

    fn resolved_name(&self) -> Result<String> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }
        self.dir
            .as_ref()
            .and_then(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| HalError::validation("dir", "\"dir\" must name a directory"))
    }
}

fn optional_string(value: Option<&Value>, field: &str) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(HalError::validation(field, format!("\"{field}\" must be a string"))),
    }
}

fn required_string(value: Option<&Value>, field: &str) -> Result<String> {
    optional_string(value, field)?
        .ok_or_else(|| HalError::validation(field, format!("\"{field}\" is required")))
}

#[derive(Debug, Clone, Default)]
struct RegistryState {
    namespaces: BTreeMap<String, Namespace>,
    // prefix -> namespace name
    prefixes: HashMap<String, String>,
}

impl RegistryState {
    fn check_unique(&self, name: &str, prefix: &str) -> Result<()> {
        if self.namespaces.contains_key(name) {
            return Err(HalError::validation(
                "name",
                format!("namespace \"{name}\" is already registered"),
            ));
        }
        if let Some(owner) = self.prefixes.get(prefix) {
            return Err(HalError::validation(
                "prefix",
                format!("prefix \"{prefix}\" is already used by namespace \"{owner}\""),
            ));
        }
        Ok(())
    }
}

/// An immutable view of the registry taken at one point in time.
///
/// Representation builds hold one snapshot for their whole duration.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    state: Arc<RegistryState>,
}

impl RegistrySnapshot {
    /// Namespace by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Namespace> {
        self.state.namespaces.get(name)
    }

    /// Namespace owning a curie prefix
    #[must_use]
    pub fn by_prefix(&self, prefix: &str) -> Option<&Namespace> {
        self.state.prefixes.get(prefix).and_then(|name| self.state.namespaces.get(name))
    }

    /// All namespaces sorted by name
    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.state.namespaces.values()
    }

    /// The cross-namespace rel index of this snapshot
    #[must_use]
    pub fn rel_index(&self) -> RelIndex<'_> {
        RelIndex {
            snapshot: self,
        }
    }
}

/// Cross-namespace rel lookups over one [`RegistrySnapshot`].
#[derive(Debug, Clone, Copy)]
pub struct RelIndex<'a> {
    snapshot: &'a RegistrySnapshot,
}

impl<'a> RelIndex<'a> {
    /// Look up a qualified rel, `prefix:name`.
    ///
    /// Returns `None` for unqualified names, unknown prefixes and unknown rels.
    #[must_use]
    pub fn lookup(&self, qualified: &str) -> Option<&'a RelDefinition> {
        let (prefix, name) = qualified.split_once(':')?;
        self.snapshot.by_prefix(prefix)?.rel(name)
    }

    /// Look up a rel by namespace name and rel name.
    #[must_use]
    pub fn lookup_in(&self, namespace: &str, name: &str) -> Option<&'a RelDefinition> {
        self.snapshot.get(namespace)?.rel(name)
    }

    /// All rels across all namespaces, sorted by rel name.
    ///
    /// Rels sharing a name keep namespace-name order.
    #[must_use]
    pub fn list(&self) -> Vec<RelDefinition> {
        let mut rels: Vec<RelDefinition> =
            self.snapshot.namespaces().flat_map(|ns| ns.rels.iter().cloned()).collect();
        rels.sort_by(|a, b| a.name.cmp(&b.name));
        rels
    }
}

/// Registry of link-relation namespaces owned by one engine instance.
///
/// Cloning the registry clones a handle; all clones share the same state.
#[derive(Clone)]
pub struct NamespaceRegistry {
    state: Arc<RwLock<Arc<RegistryState>>>,
    loader: Arc<dyn RelLoader>,
}

impl std::fmt::Debug for NamespaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceRegistry")
            .field("namespaces", &self.state.read().namespaces.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceRegistry {
    /// Create an empty registry using [`DirectoryRelLoader`] for directory namespaces.
    #[must_use]
    pub fn new() -> Self {
        Self::with_loader(Arc::new(DirectoryRelLoader::new()))
    }

    /// Create an empty registry with a custom rel loader.
    #[must_use]
    pub fn with_loader(loader: Arc<dyn RelLoader>) -> Self {
        Self {
            state: Arc::new(RwLock::new(Arc::new(RegistryState::default()))),
            loader,
        }
    }

    /// The loader used for directory namespaces.
    #[must_use]
    pub fn loader(&self) -> &Arc<dyn RelLoader> {
        &self.loader
    }

    /// Take a consistent read-only view of the registry.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            state: Arc::clone(&self.state.read()),
        }
    }

    fn update<T>(&self, apply: impl FnOnce(&mut RegistryState) -> Result<T>) -> Result<T> {
        let mut guard = self.state.write();
        apply(Arc::make_mut(&mut guard))
    }

    /// Register a namespace.
    ///
    /// Directory specs load their rels through the registry's [`RelLoader`]
    /// after validation and the uniqueness check have passed.
    ///
    /// # Errors
    ///
    /// - [`HalError::Validation`] for an invalid spec or a duplicate name/prefix
    /// - [`HalError::IoError`] when the rel directory cannot be read
    pub fn add(&self, spec: NamespaceSpec) -> Result<NamespaceHandle> {
        spec.validate()?;
        let name = spec.resolved_name()?;
        self.snapshot().state.check_unique(&name, &spec.prefix)?;

        let rels = match &spec.dir {
            Some(dir) => {
                let rels = self.loader.load(dir)?;
                debug!("Loaded {} rels for namespace '{}' from {}", rels.len(), name, dir.display());
                rels
            }
            None => Vec::new(),
        };

        let mut namespace = Namespace {
            name: name.clone(),
            prefix: spec.prefix.clone(),
            dir: spec.dir.clone(),
            rels: Vec::with_capacity(rels.len()),
        };
        for rel in rels {
            namespace.upsert_rel(rel);
        }

        self.update(|state| {
            // re-checked under the write lock; another writer may have won the race
            state.check_unique(&name, &spec.prefix)?;
            state.prefixes.insert(spec.prefix.clone(), name.clone());
            state.namespaces.insert(name.clone(), namespace);
            Ok(())
        })?;

        debug!("Registered namespace '{}' with prefix '{}'", name, spec.prefix);
        Ok(NamespaceHandle {
            registry: self.clone(),
            name,
            prefix: spec.prefix,
        })
    }

    /// Register a namespace from an untyped spec.
    ///
    /// See [`NamespaceSpec::from_value`] for the accepted shape.
    pub fn add_value(&self, spec: &Value) -> Result<NamespaceHandle> {
        self.add(NamespaceSpec::from_value(spec)?)
    }

    /// Remove a namespace and its rels.
    ///
    /// Returns whether a namespace was removed; removing an unknown name is a no-op.
    pub fn remove(&self, name: &str) -> bool {
        let removed = self
            .update(|state| {
                let removed = state.namespaces.remove(name);
                if let Some(namespace) = &removed {
                    state.prefixes.remove(&namespace.prefix);
                }
                Ok(removed.is_some())
            })
            .unwrap_or(false);

        if removed {
            debug!("Removed namespace '{}'", name);
        } else {
            trace!("Namespace '{}' not registered, nothing to remove", name);
        }
        removed
    }

    /// Namespace by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Namespace> {
        self.snapshot().get(name).cloned()
    }

    /// Handle to a registered namespace, for adding rels.
    #[must_use]
    pub fn namespace(&self, name: &str) -> Option<NamespaceHandle> {
        self.get(name).map(|namespace| NamespaceHandle {
            registry: self.clone(),
            name: namespace.name,
            prefix: namespace.prefix,
        })
    }

    /// All namespaces sorted ascending by name.
    #[must_use]
    pub fn list(&self) -> Vec<Namespace> {
        self.snapshot().namespaces().cloned().collect()
    }

    /// Add a rel to the named namespace.
    ///
    /// # Errors
    ///
    /// [`HalError::Validation`] when the namespace is not registered or the
    /// rel name is empty.
    pub fn add_rel(
        &self,
        namespace: &str,
        rel: impl Into<RelDefinition>,
    ) -> Result<NamespaceHandle> {
        let rel = rel.into();
        if rel.name.trim().is_empty() {
            return Err(HalError::validation("name", "\"name\" is not allowed to be empty"));
        }
        if rel.name.contains(':') {
            return Err(HalError::validation("name", "\"name\" must not contain ':'"));
        }

        let prefix = self.update(|state| {
            let ns = state.namespaces.get_mut(namespace).ok_or_else(|| {
                HalError::validation(
                    "namespace",
                    format!("namespace \"{namespace}\" is not registered"),
                )
            })?;
            trace!("Adding rel '{}' to namespace '{}'", rel.name, namespace);
            ns.upsert_rel(rel);
            Ok(ns.prefix.clone())
        })?;

        Ok(NamespaceHandle {
            registry: self.clone(),
            name: namespace.to_string(),
            prefix,
        })
    }

    /// Look up a qualified rel, `prefix:name`.
    #[must_use]
    pub fn lookup(&self, qualified: &str) -> Option<RelDefinition> {
        self.snapshot().rel_index().lookup(qualified).cloned()
    }

    /// Look up a rel by namespace name and rel name.
    #[must_use]
    pub fn lookup_in(&self, namespace: &str, rel: &str) -> Option<RelDefinition> {
        self.snapshot().rel_index().lookup_in(namespace, rel).cloned()
    }

    /// All rels across all namespaces, sorted by rel name.
    #[must_use]
    pub fn rels(&self) -> Vec<RelDefinition> {
        self.snapshot().rel_index().list()
    }
}

/// Handle to one registered namespace.
///
/// Returned by [`NamespaceRegistry::add`]; supports fluent rel registration.
#[derive(Debug, Clone)]
pub struct NamespaceHandle {
    registry: NamespaceRegistry,
    name: String,
    prefix: String,
}

impl NamespaceHandle {
    /// Namespace name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Curie prefix
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Register a rel in this namespace and return the handle for chaining.
    ///
    /// A bare string registers a rel with no description; registering an
    /// existing name replaces its definition.
    pub fn rel(self, rel: impl Into<RelDefinition>) -> Result<Self> {
        self.registry.add_rel(&self.name, rel)
    }

    /// Current state of the namespace, or `None` if it was removed.
    #[must_use]
    pub fn get(&self) -> Option<Namespace> {
        self.registry.get(&self.name)
    }
}

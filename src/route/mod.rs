//! Route table and named-route resolution.
//!
//! The route table stands in for the host framework's router: it stores each
//! route's method, path pattern and HAL configuration, matches incoming
//! requests, and resolves symbolic route names to concrete paths.
//!
//! A route is addressable by its HAL `name` or, failing that, by its `id`.
//! Routes without either are stored under `"{METHOD} {path}"` and can still be
//! matched against requests.
//!
//! ```rust,no_run
//! use halform::hal::HalConfig;
//! use halform::route::{RouteEntry, RouteTable};
//! use serde_json::json;
//!
//! # fn example() -> halform::core::Result<()> {
//! let routes = RouteTable::new();
//! routes.add(
//!     RouteEntry::new("GET", "/people/{id}")?
//!         .id("person")
//!         .hal(HalConfig::new().query("{?full}")),
//! )?;
//!
//! assert_eq!(routes.resolve("person", &json!({"id": 1234}))?, "/people/1234");
//! assert_eq!(routes.resolve_with_query("person", &json!({"id": 1234}))?, "/people/1234{?full}");
//! # Ok(())
//! # }
//! ```

mod pattern;

pub use pattern::RoutePattern;

use crate::core::{HalError, Result};
use crate::hal::{HalConfig, PrepareHook};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// One route known to the engine.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    id: Option<String>,
    method: String,
    pattern: RoutePattern,
    internal: bool,
    hal: Option<Arc<HalConfig>>,
    hal_fn: Option<PrepareHook>,
}

impl RouteEntry {
    /// Create a route for `method` (or `*` for any) and a path pattern.
    pub fn new(method: &str, path: &str) -> Result<Self> {
        Ok(Self {
            id: None,
            method: method.to_ascii_uppercase(),
            pattern: RoutePattern::new(path)?,
            internal: false,
            hal: None,
            hal_fn: None,
        })
    }

    /// Set the route id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Mark the route internal; its replies are never transformed.
    #[must_use]
    pub fn internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    /// Attach a HAL configuration object.
    #[must_use]
    pub fn hal(mut self, config: HalConfig) -> Self {
        self.hal = Some(Arc::new(config));
        self
    }

    /// Attach a HAL function, run in place of a configuration's prepare hook.
    #[must_use]
    pub fn hal_fn(mut self, hook: PrepareHook) -> Self {
        self.hal_fn = Some(hook);
        self
    }

    /// Route id, if any
    #[must_use]
    pub fn route_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Upper-cased method, `*` for any
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Path pattern text
    #[must_use]
    pub fn path(&self) -> &str {
        self.pattern.pattern()
    }

    /// Parsed path pattern
    #[must_use]
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Whether replies of this route bypass the transform
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.internal
    }

    /// HAL configuration object
    #[must_use]
    pub fn hal_config(&self) -> Option<&HalConfig> {
        self.hal.as_deref()
    }

    /// HAL function
    #[must_use]
    pub fn hal_hook(&self) -> Option<&PrepareHook> {
        self.hal_fn.as_ref()
    }

    /// Symbolic name: the HAL `name`, else the route id.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.hal.as_ref().and_then(|hal| hal.name.as_deref()).or(self.id.as_deref())
    }

    /// Key under which the route is stored.
    #[must_use]
    pub fn key(&self) -> String {
        self.name().map_or_else(|| format!("{} {}", self.method, self.path()), str::to_string)
    }

    /// The route's query template, e.g. `{?full}`.
    #[must_use]
    pub fn query_template(&self) -> Option<&str> {
        self.hal.as_ref().and_then(|hal| hal.query.as_deref())
    }

    fn accepts_method(&self, method: &str) -> bool {
        self.method == "*" || self.method.eq_ignore_ascii_case(method)
    }
}

/// Registered routes, shared by clones.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Arc<DashMap<String, Arc<RouteEntry>>>,
    order: Arc<RwLock<Vec<String>>>,
}

impl RouteTable {
    /// Create an empty route table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route.
    ///
    /// # Errors
    ///
    /// - [`HalError::ConflictingHalConfig`] when the route has both a HAL
    ///   configuration and a HAL function
    /// - [`HalError::Validation`] when another route already uses the same key
    pub fn add(&self, entry: RouteEntry) -> Result<Arc<RouteEntry>> {
        let key = entry.key();
        if entry.hal.is_some() && entry.hal_fn.is_some() {
            return Err(HalError::ConflictingHalConfig {
                route: key,
            });
        }

        let mut order = self.order.write();
        if self.routes.contains_key(&key) {
            return Err(HalError::validation(
                "name",
                format!("route \"{key}\" is already registered"),
            ));
        }

        let entry = Arc::new(entry);
        self.routes.insert(key.clone(), Arc::clone(&entry));
        order.push(key.clone());
        debug!("Registered route '{}' ({} {})", key, entry.method, entry.path());
        Ok(entry)
    }

    /// Route by name, id or `"{METHOD} {path}"` key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<RouteEntry>> {
        self.routes.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// All routes in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<Arc<RouteEntry>> {
        self.order.read().iter().filter_map(|key| self.get(key)).collect()
    }

    /// Number of registered routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no routes are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the first route (in registration order) matching a request.
    ///
    /// Returns the route and its decoded path parameters.
    #[must_use]
    pub fn match_request(&self, method: &str, path: &str) -> Option<(Arc<RouteEntry>, Value)> {
        self.list().into_iter().find_map(|entry| {
            if !entry.accepts_method(method) {
                return None;
            }
            entry.pattern.matches(path).map(|params| (entry, params))
        })
    }

    /// Resolve a named route to a concrete path.
    ///
    /// # Errors
    ///
    /// - [`HalError::RouteNotFound`] for an unknown name
    /// - [`HalError::MissingRouteParameter`] for a missing required parameter
    pub fn resolve(&self, name: &str, params: &Value) -> Result<String> {
        let entry = self.get(name).ok_or_else(|| HalError::RouteNotFound {
            route: name.to_string(),
        })?;
        entry.pattern.resolve(name, params)
    }

    /// Resolve a named route and append its query template.
    pub fn resolve_with_query(&self, name: &str, params: &Value) -> Result<String> {
        let path = self.resolve(name, params)?;
        let query = self.get(name).and_then(|entry| entry.query_template().map(str::to_string));
        Ok(match query {
            Some(query) => format!("{path}{query}"),
            None => path,
        })
    }
}

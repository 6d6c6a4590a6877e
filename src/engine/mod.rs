//! The transform dispatcher.
//!
//! [`HalEngine`] owns the namespace registry, the route table and the settings,
//! and decides per reply whether a HAL document replaces the payload:
//!
//! 1. the body must be a JSON object (arrays and scalars pass through)
//! 2. the matched route must not be internal
//! 3. a registered request filter must not veto it
//! 4. the client must accept one of the configured media types
//!
//! When all hold, the representation builder runs and the reply keeps its
//! status and headers, except `content-type`, which becomes the negotiated
//! media type.
//!
//! ```rust,no_run
//! use halform::config::Settings;
//! use halform::engine::{HalEngine, Reply, RequestInfo};
//! use halform::hal::HalConfig;
//! use halform::namespace::NamespaceSpec;
//! use halform::route::RouteEntry;
//! use serde_json::json;
//!
//! # async fn example() -> halform::core::Result<()> {
//! let engine = HalEngine::new(Settings::default())?;
//! engine.registry().add(NamespaceSpec::named("mycompany", "mco"))?.rel("boss")?;
//! engine.route(
//!     RouteEntry::new("GET", "/people/{id}")?.hal(HalConfig::new().link("mco:boss", "./boss")),
//! )?;
//!
//! let request = RequestInfo::get("/people/100").with_accept("application/hal+json");
//! let reply = engine.apply(&request, Reply::json(json!({"firstName": "Bob"}))).await?;
//! assert_eq!(reply.body["_links"]["mco:boss"]["href"], "/people/100/boss");
//! # Ok(())
//! # }
//! ```

pub mod negotiate;
mod reply;
mod request;

pub use reply::{Headers, Reply};
pub use request::RequestInfo;

use crate::config::{EngineConfig, Settings};
use crate::constants::{DEFAULT_PROTOCOL, HAL_MEDIA_TYPE};
use crate::core::{HalError, Result};
use crate::hal::Link;
use crate::hal::builder::{RootPlan, build_document};
use crate::hal::representation::{BuildContext, Origin, Representation};
use crate::namespace::{NamespaceRegistry, RelDocRenderer};
use crate::route::{RouteEntry, RouteTable};
use crate::uri::resolve::{filter_query, resolve_location, with_query};
use parking_lot::RwLock;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// Builds absolute URLs: `(request, path, search) -> url`.
pub type UrlBuilder = Arc<dyn Fn(&RequestInfo, &str, &str) -> String + Send + Sync>;

/// Decides per request whether transformation is allowed at all.
pub type RequestFilter = Arc<dyn Fn(&RequestInfo) -> bool + Send + Sync>;

/// The HAL engine of one host application.
pub struct HalEngine {
    registry: NamespaceRegistry,
    routes: RouteTable,
    settings: Arc<Settings>,
    filter: RwLock<Option<RequestFilter>>,
    url_builder: RwLock<Option<UrlBuilder>>,
    docs: RelDocRenderer,
}

impl std::fmt::Debug for HalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HalEngine")
            .field("registry", &self.registry)
            .field("routes", &self.routes.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl HalEngine {
    /// Create an engine with an empty registry and route table.
    ///
    /// # Errors
    ///
    /// [`HalError::TemplateError`] when the documentation templates fail to load.
    pub fn new(settings: Settings) -> Result<Self> {
        Self::with_registry(settings, NamespaceRegistry::new())
    }

    /// Create an engine around an existing registry.
    pub fn with_registry(settings: Settings, registry: NamespaceRegistry) -> Result<Self> {
        let docs = RelDocRenderer::new(settings.rel_doc_base.clone())?;
        Ok(Self {
            registry,
            routes: RouteTable::new(),
            settings: Arc::new(settings),
            filter: RwLock::new(None),
            url_builder: RwLock::new(None),
            docs,
        })
    }

    /// Create an engine from a parsed configuration file.
    ///
    /// Relative namespace directories are resolved against `base_dir`.
    ///
    /// # Errors
    ///
    /// The first validation, I/O or route registration error.
    pub fn from_config(config: &EngineConfig, base_dir: &Path) -> Result<Self> {
        let engine = Self::new(config.settings.clone())?;
        for decl in config.namespace_decls(base_dir)? {
            let mut handle = engine.registry.add(decl.spec)?;
            for rel in decl.rels {
                handle = handle.rel(rel)?;
            }
        }
        for entry in config.route_entries()? {
            engine.routes.add(entry)?;
        }
        debug!(
            "Engine configured with {} namespaces and {} routes",
            engine.registry.list().len(),
            engine.routes.len()
        );
        Ok(engine)
    }

    /// The namespace registry.
    #[must_use]
    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    /// The route table.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// The engine settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Register a route.
    ///
    /// # Errors
    ///
    /// See [`RouteTable::add`].
    pub fn route(&self, entry: RouteEntry) -> Result<Arc<RouteEntry>> {
        self.routes.add(entry)
    }

    /// Register a request filter; returning `false` skips transformation.
    pub fn filter<F>(&self, filter: F)
    where
        F: Fn(&RequestInfo) -> bool + Send + Sync + 'static,
    {
        *self.filter.write() = Some(Arc::new(filter));
    }

    /// Replace absolute URL construction.
    pub fn url_builder<F>(&self, builder: F)
    where
        F: Fn(&RequestInfo, &str, &str) -> String + Send + Sync + 'static,
    {
        *self.url_builder.write() = Some(Arc::new(builder));
    }

    fn matched_route(&self, request: &RequestInfo) -> Option<Arc<RouteEntry>> {
        self.routes.match_request(&request.method, &request.path).map(|(entry, _)| entry)
    }

    /// The media type to transform to, or `None` to pass the reply through.
    fn negotiate(
        &self,
        request: &RequestInfo,
        route: Option<&RouteEntry>,
        reply: &Reply,
    ) -> Option<String> {
        if !reply.body.is_object() {
            trace!("Body of {} is not an object, passing through", request);
            return None;
        }
        if route.is_some_and(RouteEntry::is_internal) {
            trace!("Route for {} is internal, passing through", request);
            return None;
        }
        let filter = self.filter.read().clone();
        if let Some(filter) = filter {
            if !filter(request) {
                trace!("Request filter rejected {}", request);
                return None;
            }
        }
        negotiate::preferred_media_type(
            request.accept.as_deref(),
            &self.settings.media_types,
            self.settings.require_explicit_hal_accept,
        )
    }

    /// Whether `reply` would be transformed for `request`.
    #[must_use]
    pub fn should_transform(&self, request: &RequestInfo, reply: &Reply) -> bool {
        let route = self.matched_route(request);
        self.negotiate(request, route.as_deref(), reply).is_some()
    }

    fn self_href(request: &RequestInfo, route: Option<&RouteEntry>, reply: &Reply) -> String {
        if let Some(location) = reply.created_location() {
            return resolve_location(location);
        }
        match route.and_then(RouteEntry::query_template) {
            Some(template) => with_query(&request.path, &filter_query(&request.query, template)),
            None => request.path.clone(),
        }
    }

    fn origin(&self, request: &RequestInfo, absolute: bool) -> Option<Origin> {
        if !absolute {
            return None;
        }
        if let Some(builder) = self.url_builder.read().clone() {
            return Some(Origin::Builder(builder));
        }
        let protocol = self
            .settings
            .protocol
            .as_deref()
            .or(request.protocol.as_deref())
            .unwrap_or(DEFAULT_PROTOCOL);
        match self.settings.host.as_deref().or(request.host.as_deref()) {
            Some(host) => Some(Origin::Base(format!("{protocol}://{host}"))),
            None => {
                warn!("Absolute links requested for {} but no host is known", request);
                None
            }
        }
    }

    fn context(&self, request: &RequestInfo, absolute: bool) -> Arc<BuildContext> {
        Arc::new(BuildContext {
            registry: self.registry.snapshot(),
            routes: self.routes.clone(),
            request: request.clone(),
            rel_doc_base: self.settings.rel_doc_base.clone(),
            strict: self.settings.strict,
            origin: self.origin(request, absolute),
        })
    }

    /// Transform `reply` into a HAL document when it qualifies.
    ///
    /// Replies that do not qualify are returned unchanged.
    ///
    /// # Errors
    ///
    /// Any build failure: a failing hook or link function, an unresolved
    /// namespace in strict mode, a missing route parameter, or runaway nesting.
    pub async fn apply(&self, request: &RequestInfo, mut reply: Reply) -> Result<Reply> {
        let route = self.matched_route(request);
        let Some(media_type) = self.negotiate(request, route.as_deref(), &reply) else {
            return Ok(reply);
        };

        let config = route.as_deref().and_then(RouteEntry::hal_config);
        let absolute = self.settings.absolute || config.is_some_and(|c| c.absolute);
        let self_href = Self::self_href(request, route.as_deref(), &reply);
        let entity_hook = reply.take_to_hal();
        let entity = std::mem::take(&mut reply.body);

        let plan = RootPlan {
            config,
            route_hook: route.as_deref().and_then(RouteEntry::hal_hook),
            entity_hook: entity_hook.as_ref(),
        };
        reply.body = build_document(self.context(request, absolute), self_href, entity, plan).await?;
        reply.headers.set("content-type", media_type);
        debug!("Transformed reply for {}", request);
        Ok(reply)
    }

    /// Like [`HalEngine::apply`], but a failed build becomes a `500` reply.
    ///
    /// Only request failures expose their message in the reply body.
    pub async fn handle(&self, request: &RequestInfo, reply: Reply) -> Reply {
        match self.apply(request, reply).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Failed to build representation for {}: {}", request, e);
                let message = if e.is_request_failure() {
                    e.to_string()
                } else {
                    "An internal server error occurred".to_string()
                };
                Reply::json(json!({
                    "statusCode": 500,
                    "error": "Internal Server Error",
                    "message": message,
                }))
                .status(500)
            }
        }
    }

    /// The API root document: one link per route declaring an `api` rel.
    ///
    /// # Errors
    ///
    /// [`HalError::UnresolvedNamespace`] in strict mode.
    pub fn api_root(&self, request: &RequestInfo) -> Result<Value> {
        let absolute = self.settings.absolute;
        let mut rep = Representation::new(
            self.context(request, absolute),
            self.settings.api_path.clone(),
            json!({}),
            0,
        );

        let mut links: Vec<(String, String)> = self
            .routes
            .list()
            .iter()
            .filter_map(|route| {
                let config = route.hal_config()?;
                let rel = config.api.clone()?;
                let query = config.query.as_deref().unwrap_or_default();
                Some((rel, format!("{}{}", route.pattern().to_template(), query)))
            })
            .collect();
        links.sort_by(|a, b| a.0.cmp(&b.0));

        for (rel, href) in links {
            rep.link(&rel, Link::new(href));
        }
        rep.to_document()
    }

    /// Serve the API root and rel documentation pages.
    ///
    /// Returns `Ok(None)` when `request` addresses neither.
    pub fn serve_builtin(&self, request: &RequestInfo) -> Result<Option<Reply>> {
        let api_path = self.settings.api_path.trim_end_matches('/');
        if request.path.trim_end_matches('/') == api_path {
            let body = self.api_root(request)?;
            return Ok(Some(Reply::json(body).header("content-type", HAL_MEDIA_TYPE)));
        }

        match self.docs.render_path(&self.registry, &request.path) {
            Ok(Some(html)) => Ok(Some(
                Reply::json(Value::String(html)).header("content-type", "text/html"),
            )),
            Ok(None) => Ok(None),
            Err(e @ HalError::RelDocNotFound { .. }) => {
                debug!("{}", e);
                Ok(Some(
                    Reply::json(json!({
                        "statusCode": 404,
                        "error": "Not Found",
                        "message": e.to_string(),
                    }))
                    .status(404),
                ))
            }
            Err(e) => Err(e),
        }
    }
}

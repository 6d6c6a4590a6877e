//! The in-progress HAL document for one entity.
//!
//! A [`Representation`] is created per entity (and per embedded sub-entity),
//! decorated with links and embedded children by the builder and by user
//! prepare hooks, and serialized once the whole tree is complete. Prepare hooks
//! receive it mutably and use the methods below to add to it.

use crate::constants::{CURIES_REL, MAX_EMBED_DEPTH, SELF_REL};
use crate::core::{HalError, Result};
use crate::engine::{RequestInfo, UrlBuilder};
use crate::hal::link::Link;
use crate::namespace::{RegistrySnapshot, doc_path};
use crate::route::RouteTable;
use crate::uri::is_templated;
use crate::uri::resolve::{absolutize, has_scheme, resolve, split_path};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::trace;

/// Where absolute links point.
#[derive(Clone)]
pub(crate) enum Origin {
    /// `protocol://host[:port]`
    Base(String),
    /// User supplied URL construction
    Builder(UrlBuilder),
}

/// State shared by every representation of one document build.
pub(crate) struct BuildContext {
    pub(crate) registry: RegistrySnapshot,
    pub(crate) routes: RouteTable,
    pub(crate) request: RequestInfo,
    pub(crate) rel_doc_base: String,
    pub(crate) strict: bool,
    pub(crate) origin: Option<Origin>,
}

impl BuildContext {
    fn external_href(&self, href: &str) -> String {
        match &self.origin {
            None => href.to_string(),
            Some(_) if has_scheme(href) => href.to_string(),
            Some(Origin::Base(base)) => absolutize(href, base),
            Some(Origin::Builder(build)) => {
                let (path, search) = split_path(href);
                build(&self.request, path, search)
            }
        }
    }
}

/// One or more values under a rel.
#[derive(Debug)]
pub(crate) struct Slot<T> {
    items: Vec<T>,
    array: bool,
}

impl<T> Slot<T> {
    pub(crate) fn one(item: T) -> Self {
        Self {
            items: vec![item],
            array: false,
        }
    }

    fn empty() -> Self {
        Self {
            items: Vec::new(),
            array: false,
        }
    }

    pub(crate) fn many(items: Vec<T>) -> Self {
        Self {
            items,
            array: true,
        }
    }

    fn push(&mut self, item: T) -> &mut T {
        let idx = self.items.len();
        self.items.push(item);
        if idx > 0 {
            self.array = true;
        }
        &mut self.items[idx]
    }

    fn merge(&mut self, other: Self) {
        self.items.extend(other.items);
        self.array = true;
    }

    fn render(&self, render: impl Fn(&T) -> Value) -> Value {
        match self.items.as_slice() {
            [single] if !self.array => render(single),
            items => Value::Array(items.iter().map(render).collect()),
        }
    }
}

/// A HAL document under construction.
pub struct Representation {
    ctx: Arc<BuildContext>,
    self_href: String,
    entity: Value,
    fields: Map<String, Value>,
    links: Vec<(String, Slot<Link>)>,
    embedded: Vec<(String, Slot<Representation>)>,
    depth: usize,
}

impl std::fmt::Debug for Representation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Representation")
            .field("self_href", &self.self_href)
            .field("entity", &self.entity)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

impl Representation {
    pub(crate) fn new(
        ctx: Arc<BuildContext>,
        self_href: String,
        entity: Value,
        depth: usize,
    ) -> Self {
        let fields = entity.as_object().cloned().unwrap_or_default();
        Self {
            ctx,
            self_href,
            entity,
            fields,
            links: Vec::new(),
            embedded: Vec::new(),
            depth,
        }
    }

    pub(crate) fn context(&self) -> &Arc<BuildContext> {
        &self.ctx
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    /// The self href, server-relative unless it was given with a scheme.
    #[must_use]
    pub fn self_href(&self) -> &str {
        &self.self_href
    }

    /// Path part of the self href; relative hrefs resolve against it.
    #[must_use]
    pub fn self_path(&self) -> &str {
        split_path(&self.self_href).0
    }

    /// The source entity, unmodified.
    #[must_use]
    pub fn entity(&self) -> &Value {
        &self.entity
    }

    /// The request being answered.
    #[must_use]
    pub fn request(&self) -> &RequestInfo {
        &self.ctx.request
    }

    /// Resolve an href against this representation's self path.
    #[must_use]
    pub fn resolve(&self, href: &str) -> String {
        resolve(self.self_path(), href)
    }

    /// Resolve a named route to its path plus query template.
    ///
    /// ```rust,no_run
    /// # use halform::hal::Representation;
    /// # fn example(rep: &Representation) -> halform::core::Result<()> {
    /// let href = rep.route("person", &serde_json::json!({"id": 1234}))?;
    /// assert_eq!(href, "/people/1234{?full}");
    /// # Ok(())
    /// # }
    /// ```
    pub fn route(&self, name: &str, params: &Value) -> Result<String> {
        self.ctx.routes.resolve_with_query(name, params)
    }

    /// Add a link, resolving a relative href against the self path.
    ///
    /// Adding a rel twice turns it into an array. The `self` rel replaces the
    /// self href.
    pub fn link(&mut self, rel: &str, link: impl Into<Link>) -> &mut Self {
        let mut link = link.into();
        link.href = self.resolve(&link.href);
        link.templated = link.templated || is_templated(&link.href);
        self.push_link(rel, link);
        self
    }

    pub(crate) fn push_link(&mut self, rel: &str, link: Link) {
        if rel == SELF_REL {
            trace!("Replacing self href {} with {}", self.self_href, link.href);
            self.self_href = link.href;
            return;
        }
        match self.links.iter_mut().find(|(existing, _)| existing == rel) {
            Some((_, slot)) => {
                slot.push(link);
            }
            None => self.links.push((rel.to_string(), Slot::one(link))),
        }
    }

    /// Embed `entity` under `rel` with self href `href` and return the new child.
    ///
    /// Embedding a rel twice turns it into an array.
    ///
    /// # Errors
    ///
    /// [`HalError::EmbedDepthExceeded`] when nesting gets too deep.
    pub fn embed(&mut self, rel: &str, href: &str, entity: Value) -> Result<&mut Representation> {
        let depth = self.depth + 1;
        if depth > MAX_EMBED_DEPTH {
            return Err(HalError::EmbedDepthExceeded {
                depth: MAX_EMBED_DEPTH,
            });
        }
        let child = Self::new(Arc::clone(&self.ctx), self.resolve(href), entity, depth);

        let idx = match self.embedded.iter().position(|(existing, _)| existing == rel) {
            Some(idx) => idx,
            None => {
                self.embedded.push((rel.to_string(), Slot::empty()));
                self.embedded.len() - 1
            }
        };
        Ok(self.embedded[idx].1.push(child))
    }

    pub(crate) fn attach(&mut self, rel: &str, slot: Slot<Representation>) {
        match self.embedded.iter_mut().find(|(existing, _)| existing == rel) {
            Some((_, existing)) => existing.merge(slot),
            None => self.embedded.push((rel.to_string(), slot)),
        }
    }

    /// Embedded children under `rel`.
    #[must_use]
    pub fn embedded(&self, rel: &str) -> Vec<&Representation> {
        self.embedded
            .iter()
            .filter(|(existing, _)| existing == rel)
            .flat_map(|(_, slot)| slot.items.iter())
            .collect()
    }

    /// Set a payload field.
    pub fn prop(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Omit payload fields from the document.
    pub fn ignore<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for field in fields {
            self.fields.remove(field.as_ref());
        }
        self
    }

    /// Remove a dot-path from the payload fields.
    pub(crate) fn remove_path(&mut self, path: &str) {
        let mut keys: Vec<&str> = path.split('.').collect();
        let Some(last) = keys.pop() else {
            return;
        };
        let mut current = &mut self.fields;
        for key in keys {
            match current.get_mut(key) {
                Some(Value::Object(next)) => current = next,
                _ => return,
            }
        }
        current.remove(last);
    }

    /// Serialize as an embedded document (no curies).
    #[must_use]
    pub fn to_value(&self) -> Value {
        self.render(&[])
    }

    /// Serialize as the root document, declaring curies for every namespace
    /// prefix used anywhere in the tree.
    ///
    /// # Errors
    ///
    /// [`HalError::UnresolvedNamespace`] in strict mode when a qualified rel
    /// has an unknown prefix or names an unregistered rel.
    pub fn to_document(&self) -> Result<Value> {
        let curies = self.curies()?;
        Ok(self.render(&curies))
    }

    fn collect_rels<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.extend(self.links.iter().map(|(rel, _)| rel.as_str()));
        for (rel, slot) in &self.embedded {
            out.push(rel);
            for child in &slot.items {
                child.collect_rels(out);
            }
        }
    }

    fn curies(&self) -> Result<Vec<Value>> {
        let mut rels = Vec::new();
        self.collect_rels(&mut rels);

        let registry = &self.ctx.registry;
        let mut used: BTreeMap<&str, &str> = BTreeMap::new();
        for rel in rels {
            if rel.contains("//") {
                continue;
            }
            let Some((prefix, name)) = rel.split_once(':') else {
                continue;
            };
            match registry.by_prefix(prefix) {
                Some(namespace) => {
                    if self.ctx.strict && namespace.rel(name).is_none() {
                        return Err(HalError::UnresolvedNamespace {
                            rel: rel.to_string(),
                        });
                    }
                    used.insert(prefix, namespace.name());
                }
                None if self.ctx.strict => {
                    return Err(HalError::UnresolvedNamespace {
                        rel: rel.to_string(),
                    });
                }
                None => trace!("Prefix '{}' of rel '{}' is not registered", prefix, rel),
            }
        }

        Ok(used
            .into_iter()
            .map(|(prefix, namespace)| {
                let href = doc_path(&self.ctx.rel_doc_base, namespace, Some("{rel}"));
                json!({
                    "name": prefix,
                    "href": self.ctx.external_href(&href),
                    "templated": true,
                })
            })
            .collect())
    }

    fn external_link(&self, link: &Link) -> Value {
        let mut link = link.clone();
        link.href = self.ctx.external_href(&link.href);
        link.to_value()
    }

    fn render(&self, curies: &[Value]) -> Value {
        let mut links = Map::new();
        links.insert(SELF_REL.to_string(), self.external_link(&Link::new(self.self_href.as_str())));
        if !curies.is_empty() {
            links.insert(CURIES_REL.to_string(), Value::Array(curies.to_vec()));
        }
        for (rel, slot) in &self.links {
            links.insert(rel.clone(), slot.render(|link| self.external_link(link)));
        }

        let mut doc = Map::new();
        doc.insert("_links".to_string(), Value::Object(links));
        if !self.embedded.is_empty() {
            let embedded: Map<String, Value> = self
                .embedded
                .iter()
                .map(|(rel, slot)| (rel.clone(), slot.render(Self::to_value)))
                .collect();
            doc.insert("_embedded".to_string(), Value::Object(embedded));
        }
        for (key, value) in &self.fields {
            if key != "_links" && key != "_embedded" {
                doc.insert(key.clone(), value.clone());
            }
        }
        Value::Object(doc)
    }
}

//! Builds representation trees from route configuration.
//!
//! Each representation goes through the same stages:
//!
//! 1. self href captured (request path, created location or embed href)
//! 2. configured links resolved in declaration order
//! 3. configured embedded resources extracted and built, children first
//! 4. prepare hooks awaited
//! 5. serialized, with curies, once the root is complete
//!
//! Any failure aborts the whole build; no partial document is produced.

use crate::constants::MAX_EMBED_DEPTH;
use crate::core::{HalError, Result};
use crate::hal::config::{EmbedSpec, HalConfig};
use crate::hal::hooks::{LinkContext, PrepareHook};
use crate::hal::link::{Link, LinkSpec};
use crate::hal::representation::{BuildContext, Representation, Slot};
use crate::uri::is_templated;
use crate::uri::template::{UriTemplate, lookup_path};
use futures::future::{BoxFuture, try_join_all};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// What to run for the root of a document.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct RootPlan<'a> {
    pub(crate) config: Option<&'a HalConfig>,
    pub(crate) route_hook: Option<&'a PrepareHook>,
    pub(crate) entity_hook: Option<&'a PrepareHook>,
}

/// Build the root representation of `entity` and serialize it.
pub(crate) async fn build_document(
    ctx: Arc<BuildContext>,
    self_href: String,
    entity: Value,
    plan: RootPlan<'_>,
) -> Result<Value> {
    debug!("Building representation for {}", self_href);
    let mut rep = Representation::new(ctx, self_href, entity, 0);

    if let Some(config) = plan.config {
        resolve_links(&mut rep, &config.links, None).await?;
        resolve_embedded(&mut rep, &config.embedded).await?;
        rep.ignore(&config.ignore);
    }

    let route_hook = plan.route_hook.or_else(|| plan.config.and_then(|c| c.prepare.as_ref()));
    if let Some(hook) = route_hook {
        debug!("Running route prepare hook for {}", rep.self_href());
        hook.call(&mut rep)
            .await
            .map_err(|e| HalError::prepare_failure("route prepare", &e))?;
    }
    if let Some(hook) = plan.entity_hook {
        debug!("Running entity conversion hook for {}", rep.self_href());
        hook.call(&mut rep)
            .await
            .map_err(|e| HalError::prepare_failure("entity conversion", &e))?;
    }

    rep.to_document()
}

/// Template bindings: the entity's own fields, plus `self` and `item` inside
/// embedded resources.
fn bindings(entity: &Value, parent: Option<&Value>, item: Option<&Value>) -> Value {
    let mut map = entity.as_object().cloned().unwrap_or_else(Map::new);
    if let Some(parent) = parent {
        map.insert("self".to_string(), parent.clone());
    }
    if let Some(item) = item {
        map.insert("item".to_string(), item.clone());
    }
    Value::Object(map)
}

/// Expand a configured href and resolve it against `base`.
fn expand_static(base: &Representation, spec: &LinkSpec, bindings: &Value) -> Option<Link> {
    let mut link = match spec {
        LinkSpec::Literal(href) => {
            return Some(Link {
                href: base.resolve(href),
                ..Link::default()
            });
        }
        LinkSpec::Templated(href) => Link {
            href: href.clone(),
            ..Link::default()
        },
        LinkSpec::Object(link) => link.clone(),
        LinkSpec::Dynamic(_) => return None,
    };
    let expansion = UriTemplate::parse(&link.href).expand(bindings);
    trace!("Expanded {} to {}", link.href, expansion.href);
    link.href = base.resolve(&expansion.href);
    link.templated = link.templated || expansion.templated;
    Some(link)
}

async fn call_link_fn(base: &Representation, spec: &LinkSpec, ctx: LinkContext<'_>) -> Result<Link> {
    let LinkSpec::Dynamic(f) = spec else {
        return Err(HalError::validation("href", "expected a link function"));
    };
    let mut link = f
        .call(base, ctx)
        .await
        .map_err(|e| HalError::prepare_failure("link function", &e))?;
    link.href = base.resolve(&link.href);
    link.templated = link.templated || is_templated(&link.href);
    Ok(link)
}

async fn resolve_links(
    rep: &mut Representation,
    links: &[(String, LinkSpec)],
    parent: Option<&Value>,
) -> Result<()> {
    if links.is_empty() {
        return Ok(());
    }
    let item = parent.map(|_| rep.entity().clone());
    let bindings = bindings(rep.entity(), parent, item.as_ref());

    for (rel, spec) in links {
        let link = match expand_static(rep, spec, &bindings) {
            Some(link) => link,
            None => {
                let ctx = LinkContext {
                    entity: rep.entity(),
                    item: parent.map(|_| rep.entity()),
                    parent,
                };
                call_link_fn(rep, spec, ctx).await?
            }
        };
        debug!("Resolved link {} -> {}", rel, link.href);
        rep.push_link(rel, link);
    }
    Ok(())
}

async fn resolve_embedded(rep: &mut Representation, embedded: &[(String, EmbedSpec)]) -> Result<()> {
    for (rel, spec) in embedded {
        let Some(value) = lookup_path(rep.entity(), &spec.path).cloned() else {
            trace!("Nothing to embed at '{}' for {}", spec.path, rel);
            continue;
        };
        rep.remove_path(&spec.path);

        let slot = match value {
            Value::Null => {
                trace!("Null value at '{}', skipping {}", spec.path, rel);
                continue;
            }
            Value::Array(items) => {
                debug!("Embedding {} items under {}", items.len(), rel);
                let parent: &Representation = rep;
                let children =
                    try_join_all(items.into_iter().map(|item| build_child(parent, spec, item)))
                        .await?;
                Slot::many(children)
            }
            item => {
                debug!("Embedding one item under {}", rel);
                let child = build_child(rep, spec, item).await?;
                if spec.collection { Slot::many(vec![child]) } else { Slot::one(child) }
            }
        };
        rep.attach(rel, slot);
    }
    Ok(())
}

fn build_child<'a>(
    parent: &'a Representation,
    spec: &'a EmbedSpec,
    item: Value,
) -> BoxFuture<'a, Result<Representation>> {
    Box::pin(async move {
        let depth = parent.depth() + 1;
        if depth > MAX_EMBED_DEPTH {
            return Err(HalError::EmbedDepthExceeded {
                depth: MAX_EMBED_DEPTH,
            });
        }
        if !item.is_object() {
            warn!("Embedded value at '{}' is not an object", spec.path);
        }

        let href_bindings = bindings(&item, Some(parent.entity()), Some(&item));
        let href = match expand_static(parent, &spec.href, &href_bindings) {
            Some(link) => link.href,
            None => {
                let ctx = LinkContext {
                    entity: parent.entity(),
                    item: Some(&item),
                    parent: Some(parent.entity()),
                };
                call_link_fn(parent, &spec.href, ctx).await?.href
            }
        };

        let mut child = Representation::new(Arc::clone(parent.context()), href, item, depth);
        resolve_links(&mut child, &spec.links, Some(parent.entity())).await?;
        resolve_embedded(&mut child, &spec.embedded).await?;
        if let Some(hook) = &spec.prepare {
            hook.call(&mut child)
                .await
                .map_err(|e| HalError::prepare_failure("embedded prepare", &e))?;
        }
        Ok(child)
    })
}

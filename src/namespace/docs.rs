//! Human-readable rel documentation pages.
//!
//! Rel documentation is served under a base path (`/rels` by default):
//! `{base}/{namespace}` lists a namespace's rels and `{base}/{namespace}/{rel}`
//! documents one rel. These are the targets of the curie hrefs emitted in HAL
//! documents. Pages are rendered with Tera using built-in templates; template
//! names end in `.html` so values are auto-escaped.

use crate::constants::DEFAULT_REL_DOC_BASE;
use crate::core::{HalError, Result};
use crate::namespace::{NamespaceRegistry, RelLoader};
use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

const REL_TEMPLATE_NAME: &str = "rel.html";
const NAMESPACE_TEMPLATE_NAME: &str = "namespace.html";

const REL_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><title>{{ prefix }}:{{ rel }}</title></head>
<body>
<h1>{{ prefix }}:{{ rel }}</h1>
<p class="namespace">Namespace: <a href="{{ namespace_href | safe }}">{{ namespace }}</a></p>
{% if description %}<p class="description">{{ description }}</p>{% endif %}
{% if body %}<pre class="body">{{ body }}</pre>{% endif %}
</body>
</html>
"#;

const NAMESPACE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><title>{{ namespace }}</title></head>
<body>
<h1>{{ namespace }} ({{ prefix }})</h1>
<ul>
{% for rel in rels %}<li><a href="{{ rel.href | safe }}">{{ prefix }}:{{ rel.name }}</a>{% if rel.description %} - {{ rel.description }}{% endif %}</li>
{% endfor %}</ul>
</body>
</html>
"#;

/// Path of a rel's documentation page under `base`.
///
/// ```rust
/// use halform::namespace::doc_path;
///
/// assert_eq!(doc_path("/rels", "mycompany", Some("boss")), "/rels/mycompany/boss");
/// assert_eq!(doc_path("/rels/", "mycompany", None), "/rels/mycompany");
/// ```
#[must_use]
pub fn doc_path(base: &str, namespace: &str, rel: Option<&str>) -> String {
    let base = base.trim_end_matches('/');
    match rel {
        Some(rel) => format!("{base}/{namespace}/{rel}"),
        None => format!("{base}/{namespace}"),
    }
}

#[derive(Serialize)]
struct RelEntry<'a> {
    name: &'a str,
    description: Option<&'a str>,
    href: String,
}

/// Renders rel documentation pages from a [`NamespaceRegistry`].
pub struct RelDocRenderer {
    tera: Tera,
    base: String,
}

impl std::fmt::Debug for RelDocRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelDocRenderer").field("base", &self.base).finish()
    }
}

impl RelDocRenderer {
    /// Create a renderer serving pages under `base`.
    pub fn new(base: impl Into<String>) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(REL_TEMPLATE_NAME, REL_TEMPLATE)?;
        tera.add_raw_template(NAMESPACE_TEMPLATE_NAME, NAMESPACE_TEMPLATE)?;
        Ok(Self {
            tera,
            base: base.into(),
        })
    }

    /// Create a renderer serving pages under the default `/rels` base.
    pub fn with_default_base() -> Result<Self> {
        Self::new(DEFAULT_REL_DOC_BASE)
    }

    /// Base path of the documentation pages.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Split a request path into `(namespace, rel)` when it addresses a page.
    ///
    /// ```rust
    /// use halform::namespace::RelDocRenderer;
    ///
    /// let renderer = RelDocRenderer::with_default_base().unwrap();
    /// assert_eq!(
    ///     renderer.parse_path("/rels/mycompany/boss"),
    ///     Some(("mycompany".to_string(), Some("boss".to_string())))
    /// );
    /// assert_eq!(renderer.parse_path("/rels/mycompany"), Some(("mycompany".to_string(), None)));
    /// assert_eq!(renderer.parse_path("/people/100"), None);
    /// ```
    #[must_use]
    pub fn parse_path(&self, path: &str) -> Option<(String, Option<String>)> {
        let base = self.base.trim_end_matches('/');
        let rest = path.strip_prefix(base)?.strip_prefix('/')?;
        let rest = rest.trim_end_matches('/');
        let mut parts = rest.split('/');
        let namespace = parts.next().filter(|ns| !ns.is_empty())?.to_string();
        let rel = parts.next().map(str::to_string);
        if parts.next().is_some() {
            return None;
        }
        Some((namespace, rel))
    }

    /// Render the page for one rel.
    ///
    /// Directory namespaces include the rel's documentation body, fetched
    /// through the registry's loader.
    ///
    /// # Errors
    ///
    /// [`HalError::RelDocNotFound`] when the namespace or rel is not registered.
    pub fn render_rel(
        &self,
        registry: &NamespaceRegistry,
        namespace: &str,
        rel: &str,
    ) -> Result<String> {
        let not_found = || HalError::RelDocNotFound {
            namespace: namespace.to_string(),
            rel: rel.to_string(),
        };
        let ns = registry.get(namespace).ok_or_else(not_found)?;
        let definition = ns.rel(rel).ok_or_else(not_found)?;

        let body = match ns.dir() {
            Some(dir) => registry.loader().document(dir, rel)?.map(|doc| doc.body),
            None => None,
        };

        let mut context = Context::new();
        context.insert("namespace", ns.name());
        context.insert("namespace_href", &doc_path(&self.base, ns.name(), None));
        context.insert("prefix", ns.prefix());
        context.insert("rel", &definition.name);
        context.insert("description", &definition.description);
        context.insert("body", &body.map(|b| b.trim().to_string()));

        debug!("Rendering documentation for {}:{}", ns.prefix(), rel);
        Ok(self.tera.render(REL_TEMPLATE_NAME, &context)?)
    }

    /// Render the index page of a namespace.
    ///
    /// # Errors
    ///
    /// [`HalError::RelDocNotFound`] when the namespace is not registered.
    pub fn render_namespace(&self, registry: &NamespaceRegistry, namespace: &str) -> Result<String> {
        let ns = registry.get(namespace).ok_or_else(|| HalError::RelDocNotFound {
            namespace: namespace.to_string(),
            rel: String::new(),
        })?;

        let mut rels: Vec<RelEntry<'_>> = ns
            .rels()
            .iter()
            .map(|rel| RelEntry {
                name: &rel.name,
                description: rel.description.as_deref(),
                href: doc_path(&self.base, ns.name(), Some(&rel.name)),
            })
            .collect();
        rels.sort_by(|a, b| a.name.cmp(b.name));

        let mut context = Context::new();
        context.insert("namespace", ns.name());
        context.insert("prefix", ns.prefix());
        context.insert("rels", &rels);

        Ok(self.tera.render(NAMESPACE_TEMPLATE_NAME, &context)?)
    }

    /// Render whatever page `path` addresses.
    ///
    /// Returns `Ok(None)` when the path is outside the documentation base.
    pub fn render_path(&self, registry: &NamespaceRegistry, path: &str) -> Result<Option<String>> {
        match self.parse_path(path) {
            Some((namespace, Some(rel))) => self.render_rel(registry, &namespace, &rel).map(Some),
            Some((namespace, None)) => self.render_namespace(registry, &namespace).map(Some),
            None => Ok(None),
        }
    }
}

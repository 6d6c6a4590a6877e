//! HAL link objects and link specifications.

use crate::core::{HalError, Result};
use crate::hal::hooks::LinkFn;
use crate::uri::is_templated;
use serde::Serialize;
use serde_json::{Map, Value};

const LINK_FIELDS: &[&str] =
    &["href", "templated", "title", "name", "type", "deprecation", "profile", "hreflang"];

fn is_false(value: &bool) -> bool {
    !*value
}

/// A HAL link object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Target URI or URI template
    pub href: String,
    /// Whether `href` is a URI template
    #[serde(skip_serializing_if = "is_false")]
    pub templated: bool,
    /// Human readable title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Secondary key for selecting among links of one rel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Media type hint
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Deprecation notice URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<String>,
    /// Profile URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Language of the target resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hreflang: Option<String>,
}

impl Link {
    /// A link to `href`, flagged templated when it contains an expression.
    pub fn new(href: impl Into<String>) -> Self {
        let href = href.into();
        Self {
            templated: is_templated(&href),
            href,
            ..Self::default()
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the media type hint.
    #[must_use]
    pub fn with_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Parse a link object, e.g. `{ "href": "../{bossId}", "title": "Boss" }`.
    ///
    /// # Errors
    ///
    /// [`HalError::Validation`] for a missing `href`, unknown keys or values of
    /// the wrong type.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| HalError::validation("href", "\"link\" must be a string or an object"))?;
        for key in map.keys() {
            if !LINK_FIELDS.contains(&key.as_str()) {
                return Err(HalError::validation(key.as_str(), format!("\"{key}\" is not allowed")));
            }
        }

        let href = link_string(map, "href")?
            .ok_or_else(|| HalError::validation("href", "\"href\" is required"))?;
        let templated = match map.get("templated") {
            None => false,
            Some(Value::Bool(flag)) => *flag,
            Some(_) => {
                return Err(HalError::validation("templated", "\"templated\" must be a boolean"));
            }
        };

        Ok(Self {
            templated,
            href,
            title: link_string(map, "title")?,
            name: link_string(map, "name")?,
            media_type: link_string(map, "type")?,
            deprecation: link_string(map, "deprecation")?,
            profile: link_string(map, "profile")?,
            hreflang: link_string(map, "hreflang")?,
        })
    }

    /// Serialize to a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("href".into(), Value::String(self.href.clone()));
        if self.templated {
            map.insert("templated".into(), Value::Bool(true));
        }
        let optional = [
            ("title", &self.title),
            ("name", &self.name),
            ("type", &self.media_type),
            ("deprecation", &self.deprecation),
            ("profile", &self.profile),
            ("hreflang", &self.hreflang),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                map.insert(key.into(), Value::String(value.clone()));
            }
        }
        Value::Object(map)
    }
}

fn link_string(map: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(HalError::validation(field, format!("\"{field}\" must be a string"))),
    }
}

impl From<&str> for Link {
    fn from(href: &str) -> Self {
        Self::new(href)
    }
}

impl From<String> for Link {
    fn from(href: String) -> Self {
        Self::new(href)
    }
}

/// How a configured link (or embed href) is produced.
#[derive(Debug, Clone)]
pub enum LinkSpec {
    /// A plain href with no template expressions
    Literal(String),
    /// An href containing template expressions, expanded with entity bindings
    Templated(String),
    /// A full link object whose href is expanded like [`LinkSpec::Templated`]
    Object(Link),
    /// A function computing the link
    Dynamic(LinkFn),
}

impl LinkSpec {
    /// Parse a configured link: a string or a link object.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(href) => Ok(Self::from(href.as_str())),
            Value::Object(_) => Link::from_value(value).map(Self::Object),
            _ => Err(HalError::validation("href", "\"link\" must be a string or an object")),
        }
    }
}

impl From<&str> for LinkSpec {
    fn from(href: &str) -> Self {
        if is_templated(href) {
            Self::Templated(href.to_string())
        } else {
            Self::Literal(href.to_string())
        }
    }
}

impl From<String> for LinkSpec {
    fn from(href: String) -> Self {
        Self::from(href.as_str())
    }
}

impl From<Link> for LinkSpec {
    fn from(link: Link) -> Self {
        Self::Object(link)
    }
}

impl From<LinkFn> for LinkSpec {
    fn from(f: LinkFn) -> Self {
        Self::Dynamic(f)
    }
}

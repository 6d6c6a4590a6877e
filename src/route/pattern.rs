//! Route path patterns.
//!
//! Patterns use the host router's syntax:
//!
//! - `{name}` a required parameter filling one path segment or part of one
//! - `{name?}` an optional parameter; must fill a whole trailing segment
//! - `{name*}` a wildcard parameter spanning any number of segments
//!
//! ```rust
//! use halform::route::RoutePattern;
//! use serde_json::json;
//!
//! let pattern = RoutePattern::new("/deez/treez/{foo}/{bar}").unwrap();
//! let path = pattern.resolve("deez-treez", &json!({"foo": "are/fire", "bar": "proof"})).unwrap();
//! assert_eq!(path, "/deez/treez/are%2Ffire/proof");
//! ```

use crate::core::{HalError, Result};
use crate::uri::encode::{decode_query_component, encode_segment};
use serde_json::{Map, Value};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Param {
        name: String,
        optional: bool,
        wildcard: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    pieces: Vec<Piece>,
}

impl Segment {
    fn sole_param(&self) -> Option<(&str, bool, bool)> {
        match self.pieces.as_slice() {
            [
                Piece::Param {
                    name,
                    optional,
                    wildcard,
                },
            ] => Some((name.as_str(), *optional, *wildcard)),
            _ => None,
        }
    }
}

/// A parsed route path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    pattern: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a path pattern.
    ///
    /// # Errors
    ///
    /// [`HalError::Validation`] when the pattern does not start with `/`, has
    /// an unclosed or empty parameter, or uses `?`/`*` on a parameter that does
    /// not fill a whole trailing segment.
    pub fn new(pattern: &str) -> Result<Self> {
        if !pattern.starts_with('/') {
            return Err(HalError::validation(
                "path",
                format!("route path '{pattern}' must start with '/'"),
            ));
        }

        let raw_segments: Vec<&str> = pattern[1..].split('/').collect();
        let last = raw_segments.len() - 1;
        let mut segments = Vec::with_capacity(raw_segments.len());

        for (idx, raw) in raw_segments.iter().enumerate() {
            let segment = parse_segment(pattern, raw)?;
            for piece in &segment.pieces {
                if let Piece::Param {
                    name,
                    optional,
                    wildcard,
                } = piece
                {
                    let trailing_whole = idx == last && segment.pieces.len() == 1;
                    if (*optional || *wildcard) && !trailing_whole {
                        return Err(HalError::validation(
                            "path",
                            format!(
                                "parameter '{name}' in '{pattern}' must fill the last path segment"
                            ),
                        ));
                    }
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    /// The original pattern text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parameter names in declaration order.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().flat_map(|segment| {
            segment.pieces.iter().filter_map(|piece| match piece {
                Piece::Param { name, .. } => Some(name.as_str()),
                Piece::Literal(_) => None,
            })
        })
    }

    /// Render the pattern as a URI template (`{id?}` and `{path*}` become plain expressions).
    ///
    /// ```rust
    /// use halform::route::RoutePattern;
    ///
    /// let pattern = RoutePattern::new("/people/{id?}").unwrap();
    /// assert_eq!(pattern.to_template(), "/people/{id}");
    /// ```
    #[must_use]
    pub fn to_template(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            for piece in &segment.pieces {
                match piece {
                    Piece::Literal(text) => out.push_str(text),
                    Piece::Param { name, .. } => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
            }
        }
        out
    }

    /// Substitute `params` into the pattern.
    ///
    /// Scalar values are percent-encoded as a single segment, so `/` becomes
    /// `%2F`; wildcard values keep their `/` separators. Entries in `params`
    /// that are not declared parameters are ignored, and a declared parameter
    /// bound to an object, array or null counts as missing.
    ///
    /// # Errors
    ///
    /// [`HalError::MissingRouteParameter`] when a required parameter has no value.
    pub fn resolve(&self, route: &str, params: &Value) -> Result<String> {
        let empty = Map::new();
        let params = params.as_object().unwrap_or(&empty);
        let mut out = String::new();

        for segment in &self.segments {
            if let Some((name, true, _)) = segment.sole_param() {
                if scalar_param(params, name).is_none() {
                    trace!("Omitting optional parameter '{}' of route '{}'", name, route);
                    continue;
                }
            }

            out.push('/');
            for piece in &segment.pieces {
                match piece {
                    Piece::Literal(text) => out.push_str(text),
                    Piece::Param {
                        name,
                        optional,
                        wildcard,
                    } => match scalar_param(params, name) {
                        Some(value) if *wildcard => {
                            let encoded: Vec<String> =
                                value.split('/').map(encode_segment).collect();
                            out.push_str(&encoded.join("/"));
                        }
                        Some(value) => out.push_str(&encode_segment(&value)),
                        None if *optional || *wildcard => {}
                        None => {
                            return Err(HalError::MissingRouteParameter {
                                route: route.to_string(),
                                parameter: name.clone(),
                            });
                        }
                    },
                }
            }
        }

        if out.is_empty() {
            out.push('/');
        }
        Ok(out)
    }

    /// Match a request path, returning the decoded parameters on success.
    ///
    /// ```rust
    /// use halform::route::RoutePattern;
    /// use serde_json::json;
    ///
    /// let pattern = RoutePattern::new("/people/{id}").unwrap();
    /// assert_eq!(pattern.matches("/people/100"), Some(json!({"id": "100"})));
    /// assert_eq!(pattern.matches("/people"), None);
    /// ```
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<Value> {
        let path = path.strip_prefix('/')?;
        let parts: Vec<&str> = path.split('/').collect();
        let mut params = Map::new();

        for (idx, segment) in self.segments.iter().enumerate() {
            match segment.sole_param() {
                Some((name, _, true)) => {
                    let rest = parts.get(idx..).map(|rest| rest.join("/")).unwrap_or_default();
                    if !rest.is_empty() {
                        params.insert(name.to_string(), Value::String(decode_path(&rest)));
                    }
                    return Some(Value::Object(params));
                }
                Some((name, true, false)) => {
                    if let Some(part) = parts.get(idx).filter(|part| !part.is_empty()) {
                        params.insert(name.to_string(), Value::String(decode_path(part)));
                    }
                }
                Some((name, false, false)) => {
                    let part = parts.get(idx).filter(|part| !part.is_empty())?;
                    params.insert(name.to_string(), Value::String(decode_path(part)));
                }
                None => {
                    let part = parts.get(idx)?;
                    match_pieces(&segment.pieces, part, &mut params)?;
                }
            }
        }

        if parts.len() > self.segments.len() {
            return None;
        }
        Some(Value::Object(params))
    }
}

fn parse_segment(pattern: &str, raw: &str) -> Result<Segment> {
    let invalid = |detail: &str| {
        HalError::validation("path", format!("invalid route path '{pattern}': {detail}"))
    };

    let mut pieces = Vec::new();
    let mut rest = raw;
    while let Some(open) = rest.find('{') {
        if open > 0 {
            pieces.push(Piece::Literal(rest[..open].to_string()));
        }
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| invalid("unclosed parameter"))?;
        let token = &after[..close];
        let (name, optional, wildcard) = if let Some(name) = token.strip_suffix('?') {
            (name, true, false)
        } else if let Some((name, _count)) = token.split_once('*') {
            (name, false, true)
        } else {
            (token, false, false)
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid("empty or malformed parameter name"));
        }
        pieces.push(Piece::Param {
            name: name.to_string(),
            optional,
            wildcard,
        });
        rest = &after[close + 1..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Literal(rest.to_string()));
    }
    Ok(Segment {
        pieces,
    })
}

fn scalar_param(params: &Map<String, Value>, name: &str) -> Option<String> {
    match params.get(name)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn decode_path(part: &str) -> String {
    // '+' is literal in paths
    decode_query_component(&part.replace('+', "%2B"))
}

/// Match a segment mixing literals and parameters, e.g. `{name}.{ext}`.
fn match_pieces(pieces: &[Piece], part: &str, params: &mut Map<String, Value>) -> Option<()> {
    let mut rest = part;
    let mut iter = pieces.iter().peekable();
    while let Some(piece) = iter.next() {
        match piece {
            Piece::Literal(text) => rest = rest.strip_prefix(text.as_str())?,
            Piece::Param { name, .. } => {
                let end = match iter.peek() {
                    Some(Piece::Literal(next)) => rest.find(next.as_str())?,
                    _ => rest.len(),
                };
                if end == 0 {
                    return None;
                }
                params.insert(name.clone(), Value::String(decode_path(&rest[..end])));
                rest = &rest[end..];
            }
        }
    }
    rest.is_empty().then_some(())
}

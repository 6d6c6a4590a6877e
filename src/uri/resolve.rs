//! Relative reference resolution and absolute URL construction.
//!
//! Relative hrefs are resolved against the *directory* formed by a
//! representation's self path, so `./boss` on `/people/100` becomes
//! `/people/100/boss` and `../{bossId}` becomes `/people/{bossId}`. Template
//! expressions are opaque while resolving: only the path part of an href takes
//! part in dot-segment removal, and that path ends at the first `?` or `#`, or
//! at a `{?`, `{&` or `{#` expression.

use crate::uri::encode::decode_query_component;
use crate::uri::template::UriTemplate;
use std::collections::HashSet;

/// Split an href into its path and the remainder (query, fragment or query expression).
///
/// ```rust
/// use halform::uri::resolve::split_path;
///
/// assert_eq!(split_path("/people/{id}{?full}"), ("/people/{id}", "{?full}"));
/// assert_eq!(split_path("/people?q=1#top"), ("/people", "?q=1#top"));
/// ```
#[must_use]
pub fn split_path(href: &str) -> (&str, &str) {
    let bytes = href.as_bytes();
    let mut in_expression = false;
    for (idx, &byte) in bytes.iter().enumerate() {
        match byte {
            b'{' if !in_expression => {
                if matches!(bytes.get(idx + 1), Some(b'?' | b'&' | b'#')) {
                    return href.split_at(idx);
                }
                in_expression = true;
            }
            b'}' if in_expression => in_expression = false,
            b'?' | b'#' if !in_expression => return href.split_at(idx),
            _ => {}
        }
    }
    (href, "")
}

/// Whether an href carries its own scheme or authority (`http://…`, `//host/…`).
#[must_use]
pub fn has_scheme(href: &str) -> bool {
    if href.starts_with("//") {
        return true;
    }
    match href.split_once("://") {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Remove `.` and `..` segments from a path (RFC 3986 §5.2.4).
///
/// `..` never climbs above the root.
#[must_use]
pub fn remove_dot_segments(path: &str) -> String {
    let absolute = path.starts_with('/');
    let body = if absolute { &path[1..] } else { path };
    let segments: Vec<&str> = body.split('/').collect();
    let last = segments.len().saturating_sub(1);

    let mut out: Vec<&str> = Vec::with_capacity(segments.len());
    for (idx, segment) in segments.iter().enumerate() {
        match *segment {
            "." => {
                if idx == last {
                    out.push("");
                }
            }
            ".." => {
                out.pop();
                if idx == last {
                    out.push("");
                }
            }
            other => out.push(other),
        }
    }

    let joined = out.join("/");
    if absolute { format!("/{joined}") } else { joined }
}

/// Resolve `href` against the directory formed by `base_path`.
///
/// `base_path` must not carry a query string. Hrefs with a scheme are returned
/// unchanged; hrefs starting with `/` only have their dot segments removed.
///
/// ```rust
/// use halform::uri::resolve::resolve;
///
/// assert_eq!(resolve("/people/100", "./boss"), "/people/100/boss");
/// assert_eq!(resolve("/people/100", "../1234"), "/people/1234");
/// assert_eq!(resolve("/people", "./{item.id}"), "/people/{item.id}");
/// assert_eq!(resolve("/people/100", "http://www.whitehouse.gov"), "http://www.whitehouse.gov");
/// ```
#[must_use]
pub fn resolve(base_path: &str, href: &str) -> String {
    if has_scheme(href) {
        return href.to_string();
    }

    let (path, rest) = split_path(href);
    let resolved = if path.starts_with('/') {
        remove_dot_segments(path)
    } else if path.is_empty() {
        base_path.to_string()
    } else {
        let base = base_path.trim_end_matches('/');
        remove_dot_segments(&format!("{base}/{path}"))
    };
    format!("{resolved}{rest}")
}

/// Resolve a created-resource location against the server root.
///
/// ```rust
/// use halform::uri::resolve::resolve_location;
///
/// assert_eq!(resolve_location("api/people/100"), "/api/people/100");
/// assert_eq!(resolve_location("/people/100?x=1"), "/people/100?x=1");
/// ```
#[must_use]
pub fn resolve_location(location: &str) -> String {
    resolve("/", location)
}

/// Prefix a server-relative href with `origin` (`protocol://host[:port]`).
///
/// Hrefs that already carry a scheme are returned unchanged.
#[must_use]
pub fn absolutize(href: &str, origin: &str) -> String {
    if has_scheme(href) {
        return href.to_string();
    }
    let origin = origin.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{origin}{href}")
    } else {
        format!("{origin}/{href}")
    }
}

/// Keep only the query parameters whose names are declared in `template`.
///
/// Pairs keep their original order and encoding. Returns the filtered query
/// without a leading `?`; empty when nothing survives.
///
/// ```rust
/// use halform::uri::resolve::filter_query;
///
/// assert_eq!(filter_query("q=funny&start=1&token=12345", "{?q*,start,limit}"), "q=funny&start=1");
/// assert_eq!(filter_query("token=12345", "{?q*,start,limit}"), "");
/// ```
#[must_use]
pub fn filter_query(query: &str, template: &str) -> String {
    let template = UriTemplate::parse(template);
    let allowed: HashSet<&str> = template.variables().map(|var| var.name.as_str()).collect();

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let name = pair.split_once('=').map_or(*pair, |(name, _)| name);
            allowed.contains(decode_query_component(name).as_str())
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Append a query string (without `?`) to a path.
#[must_use]
pub fn with_query(path: &str, query: &str) -> String {
    if query.is_empty() { path.to_string() } else { format!("{path}?{query}") }
}

//! The view of the current request the engine works with.

use crate::uri::resolve::has_scheme;
use std::fmt;

/// Method, location and negotiation inputs of one request.
///
/// ```rust
/// use halform::engine::RequestInfo;
///
/// let request = RequestInfo::get("http://localhost:9090/people?q=funny&start=1");
/// assert_eq!(request.path, "/people");
/// assert_eq!(request.query, "q=funny&start=1");
/// assert_eq!(request.host.as_deref(), Some("localhost:9090"));
/// assert_eq!(request.protocol.as_deref(), Some("http"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    /// Upper-case request method
    pub method: String,
    /// Request path, always starting with `/`
    pub path: String,
    /// Raw query string without the leading `?`
    pub query: String,
    /// `host[:port]`, when known
    pub host: Option<String>,
    /// `http`, `https`, ...
    pub protocol: Option<String>,
    /// The `Accept` header, when sent
    pub accept: Option<String>,
}

impl RequestInfo {
    /// Describe a request for `url`, which may be absolute or server-relative.
    pub fn new(method: &str, url: &str) -> Self {
        let (protocol, rest) = match url.split_once("://") {
            Some((protocol, rest)) if !url.starts_with("//") && has_scheme(url) => {
                (Some(protocol.to_ascii_lowercase()), rest)
            }
            _ => (None, url),
        };

        let (host, target) = if protocol.is_some() {
            match rest.find(['/', '?', '#']) {
                Some(idx) => (Some(&rest[..idx]), &rest[idx..]),
                None => (Some(rest), "/"),
            }
        } else {
            (None, rest)
        };

        let target = target.split_once('#').map_or(target, |(before, _)| before);
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let path = if path.starts_with('/') { path.to_string() } else { format!("/{path}") };

        Self {
            method: method.to_ascii_uppercase(),
            path,
            query: query.to_string(),
            host: host.filter(|host| !host.is_empty()).map(str::to_string),
            protocol,
            accept: None,
        }
    }

    /// A `GET` request for `url`.
    pub fn get(url: &str) -> Self {
        Self::new("GET", url)
    }

    /// Set the host, e.g. from the `Host` header.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the protocol.
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Set the `Accept` header.
    #[must_use]
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Path plus query string.
    #[must_use]
    pub fn path_and_query(&self) -> String {
        crate::uri::resolve::with_query(&self.path, &self.query)
    }
}

impl fmt::Display for RequestInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path_and_query())
    }
}

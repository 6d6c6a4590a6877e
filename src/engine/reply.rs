//! Replies passed through the engine.

use crate::constants::JSON_MEDIA_TYPE;
use crate::hal::PrepareHook;
use serde_json::Value;

/// Response headers in insertion order, looked up case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    /// An empty header list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Replace every value of `name` with `value`, keeping the first position.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter().position(|(key, _)| key.eq_ignore_ascii_case(name)) {
            Some(idx) => {
                self.0[idx].1 = value;
                let mut seen = false;
                self.0.retain(|(key, _)| {
                    if !key.eq_ignore_ascii_case(name) {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.0.push((name.to_string(), value)),
        }
    }

    /// Add a value without touching existing ones.
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.0.push((name.to_string(), value.into()));
    }

    /// Remove every value of `name`; returns whether any existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.0.len() != before
    }

    /// Headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of header values
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no headers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A reply on its way out of a route handler.
#[derive(Debug, Clone)]
pub struct Reply {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Response payload
    pub body: Value,
    to_hal: Option<PrepareHook>,
}

impl Reply {
    /// A `200` JSON reply.
    pub fn json(body: Value) -> Self {
        let mut headers = Headers::new();
        headers.set("content-type", JSON_MEDIA_TYPE);
        Self {
            status: 200,
            headers,
            body,
            to_hal: None,
        }
    }

    /// A `201 Created` reply pointing at `location`.
    pub fn created(location: impl Into<String>, body: Value) -> Self {
        let mut reply = Self::json(body).status(201);
        reply.headers.set("location", location);
        reply
    }

    /// Set the status code.
    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Set a header.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Attach the entity's own conversion hook.
    ///
    /// It runs after the route's prepare hook.
    #[must_use]
    pub fn with_to_hal(mut self, hook: PrepareHook) -> Self {
        self.to_hal = Some(hook);
        self
    }

    /// The entity's conversion hook.
    #[must_use]
    pub fn to_hal(&self) -> Option<&PrepareHook> {
        self.to_hal.as_ref()
    }

    pub(crate) fn take_to_hal(&mut self) -> Option<PrepareHook> {
        self.to_hal.take()
    }

    /// The `Location` header of a `201` reply.
    #[must_use]
    pub fn created_location(&self) -> Option<&str> {
        if self.status == 201 { self.headers.get("location") } else { None }
    }
}

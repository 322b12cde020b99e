//! Endpoint declarations for the client's dispatch table.
//!
//! An [`Endpoint`] binds everything that is fixed at declaration time: the
//! HTTP method, a route template, an API version, the content mode, fixed
//! transport options, and an optional handler run on the interpreted
//! response. Declarations are registered by name on a
//! [`ClientBuilder`](crate::ClientBuilder) and are immutable afterwards.

use crate::client::Client;
use crate::interpret::Interpreted;
use crate::Result;
use http::Method;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// How a response body is decoded before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// Decode as JSON and apply the status/results protocol (the default).
    #[default]
    Json,
    /// Parse the body as XML and hand over the document root.
    Xml,
    /// Hand over the transport response untouched.
    Raw,
}

/// Callback run on the interpreted response of one endpoint.
///
/// Receives the client instance, the interpreted payload, and any leftover
/// positional values from [`CallArgs::extra`](crate::CallArgs::extra). Its
/// result is returned from `invoke` unchanged.
pub type Handler =
    Arc<dyn Fn(&Client, Interpreted, &[Value]) -> Result<Interpreted> + Send + Sync>;

/// A declared API operation.
///
/// # Examples
///
/// ```no_run
/// use tinyclient::{Endpoint, ResponseMode};
///
/// let fetch = Endpoint::get("/profile/{user_id}");
/// let create = Endpoint::post("/notes").version(2).query("draft", "true");
/// let feed = Endpoint::get("/feed.xml").mode(ResponseMode::Xml);
/// let mirror = Endpoint::get("https://mirror.example.org/{path}").no_prefix();
/// ```
#[derive(Clone)]
pub struct Endpoint {
    pub(crate) method: Method,
    pub(crate) route: String,
    pub(crate) version: u32,
    pub(crate) apply_prefix: bool,
    pub(crate) mode: ResponseMode,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) handler: Option<Handler>,
}

impl Endpoint {
    /// Declares an endpoint with an arbitrary HTTP method.
    pub fn new(method: Method, route: impl Into<String>) -> Self {
        Self {
            method,
            route: route.into(),
            version: 1,
            apply_prefix: true,
            mode: ResponseMode::Json,
            query: Vec::new(),
            headers: Vec::new(),
            handler: None,
        }
    }

    /// Declares a GET endpoint.
    pub fn get(route: impl Into<String>) -> Self {
        Self::new(Method::GET, route)
    }

    /// Declares a POST endpoint.
    pub fn post(route: impl Into<String>) -> Self {
        Self::new(Method::POST, route)
    }

    /// Declares a PUT endpoint.
    pub fn put(route: impl Into<String>) -> Self {
        Self::new(Method::PUT, route)
    }

    /// Declares a PATCH endpoint.
    pub fn patch(route: impl Into<String>) -> Self {
        Self::new(Method::PATCH, route)
    }

    /// Declares a DELETE endpoint.
    pub fn delete(route: impl Into<String>) -> Self {
        Self::new(Method::DELETE, route)
    }

    /// Sets the API version substituted into the base URL's `{version}`
    /// placeholder. Defaults to 1.
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Uses the filled route alone as the request URL, without the client's
    /// base URL prefix.
    pub fn no_prefix(mut self) -> Self {
        self.apply_prefix = false;
        self
    }

    /// Sets the content mode. Defaults to [`ResponseMode::Json`].
    pub fn mode(mut self, mode: ResponseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Adds a fixed query parameter sent on every call to this endpoint.
    /// Call-time arguments with the same key take precedence.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Adds a fixed header sent on every call to this endpoint.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Installs the handler run on this endpoint's interpreted responses.
    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Client, Interpreted, &[Value]) -> Result<Interpreted> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("route", &self.route)
            .field("version", &self.version)
            .field("apply_prefix", &self.apply_prefix)
            .field("mode", &self.mode)
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("handler", &self.handler.as_ref().map(|_| "..."))
            .finish()
    }
}

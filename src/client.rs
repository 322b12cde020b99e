//! The API client: shared configuration, the endpoint dispatch table, and
//! the per-call pipeline.
//!
//! A [`Client`] is built once per API from a [`ClientBuilder`] and holds
//! everything shared across calls: the base URL template, timeout, retry
//! strategy, status/results keys, default headers, and the registry of
//! declared endpoints. Each [`Client::invoke`] runs the same linear
//! pipeline: resolve the base URL, split the arguments, build the final
//! URL, send the request through the lazily-created transport session,
//! interpret the response, and run the endpoint handler.

use crate::args::CallArgs;
use crate::endpoint::{Endpoint, Handler, ResponseMode};
use crate::interpret::{interpret, Interpreted, StatusHandler};
use crate::retry::RetryStrategy;
use crate::route::{build_url, RouteTemplate};
use crate::{Error, Result};
use http::{HeaderName, HeaderValue, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::Duration;
use url::Url;

/// A client for a declared REST-like API.
///
/// Cheap to clone; clones share the same configuration, transport session,
/// deferred base URL and cookie set. The transport session is created on
/// the first call and reused for the lifetime of the client.
///
/// # Examples
///
/// ```no_run
/// use tinyclient::{CallArgs, Client, Endpoint};
/// use std::time::Duration;
///
/// # async fn example() -> tinyclient::Result<()> {
/// let client = Client::builder()
///     .base_url("https://example.org/api/v{version}")
///     .timeout(Duration::from_secs(30))
///     .endpoint("fetch_profile", Endpoint::get("/profile/{user_id}"))
///     .endpoint("create_note", Endpoint::post("/notes").version(2))
///     .build()?;
///
/// let profile = client
///     .invoke("fetch_profile", CallArgs::new().arg("user_id", "42"))
///     .await?;
/// println!("profile: {:?}", profile.as_json());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    // May contain a {version} placeholder; None until an instance supplies
    // a deferred URL.
    base_url: RwLock<Option<String>>,
    timeout: Option<Duration>,
    retry_strategy: RetryStrategy,
    status_key: String,
    results_key: String,
    status_handler: Option<StatusHandler>,
    default_headers: Vec<(HeaderName, HeaderValue)>,
    cookies: RwLock<Vec<(String, String)>>,
    endpoints: BTreeMap<String, Registered>,
    session: OnceLock<reqwest::Client>,
}

/// An endpoint declaration compiled at build time: the route is parsed and
/// fixed headers are validated once, not per call.
struct Registered {
    method: Method,
    route: RouteTemplate,
    version: u32,
    apply_prefix: bool,
    mode: ResponseMode,
    query: Vec<(String, String)>,
    headers: Vec<(HeaderName, HeaderValue)>,
    handler: Option<Handler>,
}

impl Client {
    /// Creates a new [`ClientBuilder`].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Supplies the base URL for a client built without one (deferred URL
    /// mode). Takes effect for all subsequent calls.
    pub fn set_base_url(&self, url: impl Into<String>) {
        let mut slot = self.inner.base_url.write().expect("base URL lock poisoned");
        *slot = Some(url.into());
    }

    /// Installs cookie pairs forwarded verbatim as the `Cookie` header on
    /// every call.
    pub fn set_cookies<I, K, V>(&self, cookies: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut slot = self.inner.cookies.write().expect("cookie lock poisoned");
        *slot = cookies
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
    }

    /// Invokes a declared operation and returns the handler's result.
    ///
    /// # Errors
    ///
    /// * [`Error::UnknownEndpoint`] if `operation` was never registered.
    /// * [`Error::NoUrl`] if the endpoint needs a base URL and none is set.
    /// * [`Error::EmptyResponse`] / [`Error::Status`] per the JSON protocol.
    /// * [`Error::MaxRetriesExceeded`] when the retry strategy runs out.
    /// * Transport and decode errors, propagated unchanged.
    pub async fn invoke(&self, operation: &str, args: CallArgs) -> Result<Interpreted> {
        let entry = self
            .inner
            .endpoints
            .get(operation)
            .ok_or_else(|| Error::UnknownEndpoint(operation.to_string()))?;

        let base = self
            .inner
            .base_url
            .read()
            .expect("base URL lock poisoned")
            .clone();

        let split = args.split(&entry.route);
        let url = build_url(
            base.as_deref(),
            entry.version,
            &entry.route,
            &split.route_fill,
            entry.apply_prefix,
        )?;
        let url = Url::parse(&url)?;

        tracing::debug!(
            operation,
            method = %entry.method,
            url = %url,
            "dispatching endpoint call"
        );

        // Declaration-time query parameters first; call-time keys win on
        // collision.
        let mut query: Vec<(String, String)> = entry
            .query
            .iter()
            .filter(|(key, _)| !split.passthrough.contains_key(key))
            .cloned()
            .collect();
        query.extend(split.passthrough);

        let mut call_headers = Vec::with_capacity(split.headers.len());
        for (name, value) in &split.headers {
            call_headers.push((
                HeaderName::try_from(name.as_str())
                    .map_err(|e| Error::Configuration(format!("invalid header name: {e}")))?,
                HeaderValue::try_from(value.as_str())
                    .map_err(|e| Error::Configuration(format!("invalid header value: {e}")))?,
            ));
        }

        let response = self
            .send_with_retries(operation, entry, url, &query, &call_headers, split.body.as_ref())
            .await?;

        let interpreted = interpret(
            response,
            entry.mode,
            &self.inner.status_key,
            &self.inner.results_key,
            self.inner.status_handler.as_ref(),
        )
        .await?;

        tracing::info!(operation, mode = ?entry.mode, "endpoint call interpreted");

        match &entry.handler {
            Some(handler) => handler(self, interpreted, &split.extra),
            None => Ok(interpreted),
        }
    }

    /// Invokes a JSON-mode operation and deserializes the unwrapped payload
    /// into `T`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use serde::Deserialize;
    /// use tinyclient::{CallArgs, Client, Endpoint};
    ///
    /// #[derive(Deserialize)]
    /// struct Profile {
    ///     name: String,
    /// }
    ///
    /// # async fn example() -> tinyclient::Result<()> {
    /// # let client = Client::builder()
    /// #     .base_url("https://example.org/api")
    /// #     .endpoint("fetch_profile", Endpoint::get("/profile/{user_id}"))
    /// #     .build()?;
    /// let profile: Profile = client
    ///     .invoke_as("fetch_profile", CallArgs::new().arg("user_id", "42"))
    ///     .await?;
    /// println!("name: {}", profile.name);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn invoke_as<T: DeserializeOwned>(
        &self,
        operation: &str,
        args: CallArgs,
    ) -> Result<T> {
        let value = self.invoke(operation, args).await?.into_json()?;
        Ok(serde_json::from_value(value)?)
    }

    /// Sends the request, retrying network-level failures according to the
    /// configured strategy.
    async fn send_with_retries(
        &self,
        operation: &str,
        entry: &Registered,
        url: Url,
        query: &[(String, String)],
        call_headers: &[(HeaderName, HeaderValue)],
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .send_request(entry, url.clone(), query, call_headers, body, attempt)
                .await
            {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::warn!(error = %e, attempt, operation, "request failed");
                    if !e.is_retryable() {
                        return Err(e);
                    }
                    match self.inner.retry_strategy.delay_for_attempt(attempt) {
                        Some(delay) => {
                            tracing::info!(
                                delay_ms = delay.as_millis() as u64,
                                attempt,
                                operation,
                                "retrying request after delay"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => {
                            return Err(Error::MaxRetriesExceeded {
                                attempts: attempt,
                                last_error: Box::new(e),
                            })
                        }
                    }
                }
            }
        }
    }

    /// Executes a single request attempt.
    async fn send_request(
        &self,
        entry: &Registered,
        url: Url,
        query: &[(String, String)],
        call_headers: &[(HeaderName, HeaderValue)],
        body: Option<&Value>,
        attempt: usize,
    ) -> Result<reqwest::Response> {
        let mut request = self.session().request(entry.method.clone(), url);

        if !query.is_empty() {
            request = request.query(&query);
        }
        for (name, value) in &self.inner.default_headers {
            request = request.header(name, value);
        }
        for (name, value) in &entry.headers {
            request = request.header(name, value);
        }
        for (name, value) in call_headers {
            request = request.header(name, value);
        }
        if let Some(cookie) = self.cookie_header()? {
            request = request.header(http::header::COOKIE, cookie);
        }
        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(attempt, "sending request");
        Ok(request.send().await?)
    }

    /// The transport session, created on the first call and reused for the
    /// lifetime of the client.
    fn session(&self) -> &reqwest::Client {
        self.inner.session.get_or_init(|| {
            tracing::info!("creating transport session");
            reqwest::Client::new()
        })
    }

    fn cookie_header(&self) -> Result<Option<HeaderValue>> {
        let cookies = self.inner.cookies.read().expect("cookie lock poisoned");
        if cookies.is_empty() {
            return Ok(None);
        }
        let joined = cookies
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        let value = HeaderValue::try_from(joined)
            .map_err(|e| Error::Configuration(format!("invalid cookie value: {e}")))?;
        Ok(Some(value))
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use tinyclient::{ClientBuilder, Endpoint, RetryStrategy};
/// use std::time::Duration;
///
/// # fn example() -> tinyclient::Result<()> {
/// let client = ClientBuilder::new()
///     .base_url("https://example.org/api/v{version}")
///     .timeout(Duration::from_secs(30))
///     .retry_strategy(RetryStrategy::Linear {
///         delay: Duration::from_millis(100),
///         max_retries: 3,
///     })
///     .status_key("error_code")
///     .results_key("data")
///     .default_header("User-Agent", "my-app/1.0")?
///     .endpoint("list_notes", Endpoint::get("/notes"))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    retry_strategy: RetryStrategy,
    status_key: String,
    results_key: String,
    status_handler: Option<StatusHandler>,
    default_headers: Vec<(HeaderName, HeaderValue)>,
    endpoints: BTreeMap<String, Endpoint>,
}

impl ClientBuilder {
    /// Creates a builder with default settings: no base URL (deferred URL
    /// mode), no timeout, no retries, status key `"status"`, results key
    /// `"results"`.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
            retry_strategy: RetryStrategy::None,
            status_key: "status".to_string(),
            results_key: "results".to_string(),
            status_handler: None,
            default_headers: Vec::new(),
            endpoints: BTreeMap::new(),
        }
    }

    /// Sets the base URL template. May contain a `{version}` placeholder,
    /// replaced per endpoint at call time; validation of the assembled URL
    /// happens per call for the same reason.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the request timeout passed to the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the retry strategy for network-level failures.
    pub fn retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry_strategy = strategy;
        self
    }

    /// Sets the JSON field name that signals an API-level status code.
    /// Defaults to `"status"`.
    pub fn status_key(mut self, key: impl Into<String>) -> Self {
        self.status_key = key.into();
        self
    }

    /// Sets the JSON field name under which the API nests its payload.
    /// Defaults to `"results"`.
    pub fn results_key(mut self, key: impl Into<String>) -> Self {
        self.results_key = key.into();
        self
    }

    /// Installs a handler invoked whenever a decoded response contains the
    /// status key. Without one, such responses fail with
    /// [`Error::Status`].
    pub fn status_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<()> + Send + Sync + 'static,
    {
        self.status_handler = Some(Arc::new(handler));
        self
    }

    /// Adds a default header included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::Configuration(format!("invalid header name: {e}")))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::Configuration(format!("invalid header value: {e}")))?;
        self.default_headers.push((name, value));
        Ok(self)
    }

    /// Registers an endpoint declaration under an operation name. A later
    /// registration with the same name replaces the earlier one.
    pub fn endpoint(mut self, name: impl Into<String>, endpoint: Endpoint) -> Self {
        self.endpoints.insert(name.into(), endpoint);
        self
    }

    /// Builds the configured [`Client`], parsing every registered route.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for invalid route templates
    /// (duplicate or malformed placeholders) or invalid fixed headers.
    pub fn build(self) -> Result<Client> {
        let mut endpoints = BTreeMap::new();
        for (name, endpoint) in self.endpoints {
            let route = RouteTemplate::parse(&endpoint.route).map_err(|e| {
                Error::Configuration(format!("endpoint '{name}': {e}"))
            })?;
            let mut headers = Vec::with_capacity(endpoint.headers.len());
            for (header_name, value) in &endpoint.headers {
                headers.push((
                    HeaderName::try_from(header_name.as_str()).map_err(|e| {
                        Error::Configuration(format!("endpoint '{name}': invalid header name: {e}"))
                    })?,
                    HeaderValue::try_from(value.as_str()).map_err(|e| {
                        Error::Configuration(format!("endpoint '{name}': invalid header value: {e}"))
                    })?,
                ));
            }
            endpoints.insert(
                name,
                Registered {
                    method: endpoint.method,
                    route,
                    version: endpoint.version,
                    apply_prefix: endpoint.apply_prefix,
                    mode: endpoint.mode,
                    query: endpoint.query,
                    headers,
                    handler: endpoint.handler,
                },
            );
        }

        Ok(Client {
            inner: Arc::new(ClientInner {
                base_url: RwLock::new(self.base_url),
                timeout: self.timeout,
                retry_strategy: self.retry_strategy,
                status_key: self.status_key,
                results_key: self.results_key,
                status_handler: self.status_handler,
                default_headers: self.default_headers,
                cookies: RwLock::new(Vec::new()),
                endpoints,
                session: OnceLock::new(),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

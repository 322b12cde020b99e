//! # Tinyclient - declarative endpoint dispatch for REST-like APIs
//!
//! Tinyclient turns a set of declared routes into HTTP calls, handling URL
//! templating, response decoding, and API-level error signalling so call
//! sites don't have to. Declare each operation once - method, route
//! template, version, content mode - and invoke it by name with whatever
//! arguments the route needs.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tinyclient::{CallArgs, Client, Endpoint, RetryStrategy};
//! use serde::Deserialize;
//! use std::time::Duration;
//!
//! #[derive(Deserialize)]
//! struct Profile {
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> tinyclient::Result<()> {
//!     let client = Client::builder()
//!         .base_url("https://example.org/api/v{version}")
//!         .timeout(Duration::from_secs(30))
//!         .retry_strategy(RetryStrategy::ExponentialBackoff {
//!             initial_delay: Duration::from_millis(100),
//!             max_delay: Duration::from_secs(10),
//!             max_retries: 3,
//!             jitter: true,
//!         })
//!         .endpoint("fetch_profile", Endpoint::get("/profile/{user_id}"))
//!         .endpoint("create_note", Endpoint::post("/notes").version(2))
//!         .build()?;
//!
//!     let profile: Profile = client
//!         .invoke_as("fetch_profile", CallArgs::new().arg("user_id", "42"))
//!         .await?;
//!     println!("Profile: {}", profile.name);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## How a call is dispatched
//!
//! Every `invoke` runs the same pipeline:
//!
//! 1. The operation name is looked up in the client's dispatch table.
//! 2. Named arguments are split: keys matching a route placeholder fill the
//!    route, the rest are forwarded as query parameters.
//! 3. The final URL is assembled from the base URL template (with
//!    `{version}` substituted), the filled route, and exactly one trailing
//!    `/` trimmed. Placeholders without a matching argument resolve to the
//!    empty string, which makes trailing path parameters optional.
//! 4. The request goes out through a transport session created on the
//!    first call and reused afterwards.
//! 5. The response is decoded per the endpoint's content mode. JSON
//!    responses go through the status/results protocol: an empty payload is
//!    an error, a payload containing the status key triggers the status
//!    handler (or fails the call), and a payload containing the results key
//!    is narrowed to that key's value.
//! 6. The endpoint's handler, if any, receives the client, the interpreted
//!    payload, and any extra positional values, and its result is returned
//!    unchanged.
//!
//! ## Status signalling
//!
//! Some APIs report errors in the body rather than the HTTP status line:
//!
//! ```no_run
//! use tinyclient::{CallArgs, Client, Endpoint, Error};
//!
//! # async fn example() -> tinyclient::Result<()> {
//! let client = Client::builder()
//!     .base_url("https://example.org/api")
//!     .status_key("error_code")
//!     .results_key("data")
//!     .status_handler(|code, _body| {
//!         // Treat code 0 as success, anything else as fatal.
//!         if code == &serde_json::json!(0) {
//!             Ok(())
//!         } else {
//!             Err(Error::Handler(format!("API error {code}")))
//!         }
//!     })
//!     .endpoint("search", Endpoint::get("/search"))
//!     .build()?;
//!
//! let results = client
//!     .invoke("search", CallArgs::new().arg("q", "rust"))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Declarative endpoints** - one registration per operation, invoked by
//!   name with a flat argument set
//! - **Safe route substitution** - absent placeholders resolve to the empty
//!   string, making trailing path parameters optional
//! - **Versioned URLs** - a `{version}` placeholder in the base URL is
//!   filled per endpoint declaration
//! - **Status/results protocol** - API-level error codes and nested
//!   payloads are handled uniformly, with a handler escape hatch
//! - **JSON, XML and raw modes** - per-endpoint choice of decoding
//! - **Deferred URLs and cookies** - clients may receive their base URL and
//!   cookie set after construction, before the first call
//! - **Retry logic** - exponential or linear backoff for network-level
//!   failures; API-level error signals are never retried
//! - **Structured logging** - `tracing` events at each pipeline step

mod args;
mod client;
mod endpoint;
mod error;
mod interpret;
mod retry;
mod route;
pub mod xml;

pub use args::CallArgs;
pub use client::{Client, ClientBuilder};
pub use endpoint::{Endpoint, Handler, ResponseMode};
pub use error::{Error, Result};
pub use interpret::{Interpreted, StatusHandler};
pub use retry::RetryStrategy;
pub use route::RouteTemplate;

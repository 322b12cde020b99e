//! Error types for endpoint dispatch.
//!
//! All API-level failure modes live in one closed [`Error`] enum. Transport
//! errors and decode errors are converted in via `From` and otherwise left
//! untouched, so callers always see the underlying cause.

use serde_json::Value;

/// The error type for declaring endpoints and dispatching calls.
///
/// # Examples
///
/// ```no_run
/// use tinyclient::{CallArgs, Client, Endpoint, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .base_url("https://api.example.com")
///     .endpoint("search", Endpoint::get("/search"))
///     .build()?;
///
/// match client.invoke("search", CallArgs::new()).await {
///     Ok(response) => println!("Success: {:?}", response),
///     Err(Error::Status { code, .. }) => {
///         eprintln!("API signalled an error code: {}", code);
///     }
///     Err(Error::EmptyResponse) => eprintln!("API returned nothing"),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A prefixed endpoint was called while no base URL is available.
    ///
    /// Clients built without a base URL must supply one through
    /// [`Client::set_base_url`](crate::Client::set_base_url) before their
    /// first call.
    #[error("no base URL available for a prefixed endpoint")]
    NoUrl,

    /// A JSON-mode response decoded to an empty value (`{}`, `[]`, `""`,
    /// `0`, `false` or `null`).
    #[error("API returned an empty response")]
    EmptyResponse,

    /// The decoded response contained the configured status key and no
    /// status handler is installed.
    ///
    /// # Fields
    ///
    /// * `code` - The value found under the status key
    /// * `body` - The full decoded response, for inspection
    #[error("server responded with status code {code}")]
    Status {
        /// The value found under the status key.
        code: Value,
        /// The full decoded response body.
        body: Value,
    },

    /// The operation name passed to `invoke` is not in the dispatch table.
    #[error("unknown endpoint operation: {0}")]
    UnknownEndpoint(String),

    /// Invalid declaration-time or call-time configuration, such as a
    /// duplicate route placeholder or a malformed header.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The retry strategy was exhausted without a successful transport
    /// exchange.
    #[error("max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// The number of attempts made.
        attempts: usize,
        /// The last transport error encountered.
        last_error: Box<Error>,
    },

    /// A network-level error from the transport (connection failure, DNS
    /// failure, timeout). Wraps the underlying `reqwest::Error` unchanged.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be decoded as JSON.
    #[error("failed to decode JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// The response body could not be parsed as XML.
    #[error("failed to parse XML response: {0}")]
    Xml(String),

    /// The assembled request URL is not a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A status handler or endpoint handler reported a failure of its own.
    #[error("handler error: {0}")]
    Handler(String),
}

impl Error {
    /// Returns `true` if this error is potentially retryable.
    ///
    /// Only network-level transport errors qualify. API-level signals such
    /// as [`Error::Status`] or [`Error::EmptyResponse`] are terminal for the
    /// call: retrying would re-issue a request the server already answered.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_))
    }

    /// Returns the API status code if this error carries one.
    pub fn status_code(&self) -> Option<&Value> {
        match self {
            Error::Status { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// A specialized `Result` type for endpoint dispatch.
pub type Result<T> = std::result::Result<T, Error>;

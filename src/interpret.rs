//! Response interpretation: decoding plus the status/results protocol.
//!
//! JSON-mode responses go through two independent, sequential checks
//! against the same decoded mapping: status-key detection (an API-level
//! error signal) and results-key unwrapping (narrowing to the payload).
//! They are independent because an API can signal an error and still
//! include partial results; a configured status handler decides whether
//! the call proceeds.

use crate::endpoint::ResponseMode;
use crate::xml::Element;
use crate::{Error, Result};
use serde_json::Value;
use std::sync::Arc;

/// Callback invoked when a decoded JSON response contains the status key.
///
/// Receives the status code value and the full decoded response. Returning
/// `Ok(())` consumes the signal and lets the call proceed; returning an
/// error aborts the call with that error.
pub type StatusHandler = Arc<dyn Fn(&Value, &Value) -> Result<()> + Send + Sync>;

/// A decoded response, as handed to the endpoint handler.
#[derive(Debug)]
pub enum Interpreted {
    /// A decoded JSON value, already narrowed by results-key unwrapping.
    Json(Value),
    /// The root element of an XML response.
    Xml(Element),
    /// The transport response, untouched.
    Raw(reqwest::Response),
}

impl Interpreted {
    /// Returns the JSON value, if this is a JSON interpretation.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Interpreted::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the interpretation and returns its JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for XML and raw interpretations.
    pub fn into_json(self) -> Result<Value> {
        match self {
            Interpreted::Json(value) => Ok(value),
            Interpreted::Xml(_) => Err(Error::Configuration(
                "expected a JSON response, got XML".to_string(),
            )),
            Interpreted::Raw(_) => Err(Error::Configuration(
                "expected a JSON response, got a raw response".to_string(),
            )),
        }
    }

    /// Returns the XML root element, if this is an XML interpretation.
    pub fn as_xml(&self) -> Option<&Element> {
        match self {
            Interpreted::Xml(element) => Some(element),
            _ => None,
        }
    }
}

/// Decodes a transport response according to the endpoint's content mode.
pub(crate) async fn interpret(
    response: reqwest::Response,
    mode: ResponseMode,
    status_key: &str,
    results_key: &str,
    status_handler: Option<&StatusHandler>,
) -> Result<Interpreted> {
    match mode {
        ResponseMode::Raw => Ok(Interpreted::Raw(response)),
        ResponseMode::Xml => {
            let body = response.text().await?;
            Ok(Interpreted::Xml(Element::parse(&body)?))
        }
        ResponseMode::Json => {
            let url = response.url().to_string();
            let body = response.text().await?;
            let decoded: Value = serde_json::from_str(&body)?;
            let value = unwrap_json(decoded, &url, status_key, results_key, status_handler)?;
            Ok(Interpreted::Json(value))
        }
    }
}

/// Applies the empty-response, status-key and results-key checks to a
/// decoded JSON payload.
pub(crate) fn unwrap_json(
    mut decoded: Value,
    url: &str,
    status_key: &str,
    results_key: &str,
    status_handler: Option<&StatusHandler>,
) -> Result<Value> {
    if is_falsy(&decoded) {
        return Err(Error::EmptyResponse);
    }

    if let Some(code) = decoded.get(status_key).cloned() {
        tracing::warn!(code = %code, url, "API signalled a status code");
        match status_handler {
            Some(handler) => handler(&code, &decoded)?,
            None => {
                return Err(Error::Status {
                    code,
                    body: decoded,
                })
            }
        }
    }

    // Checked regardless of whether the status branch fired.
    if let Some(results) = decoded.get_mut(results_key) {
        return Ok(results.take());
    }
    Ok(decoded)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const URL: &str = "https://example.org/api/my-endpoint";

    fn unwrap(value: Value, status_key: &str, results_key: &str) -> Result<Value> {
        unwrap_json(value, URL, status_key, results_key, None)
    }

    #[test]
    fn test_empty_values_are_rejected() {
        for value in [json!({}), json!([]), json!(""), json!(0), json!(null), json!(false)] {
            let result = unwrap(value.clone(), "status", "results");
            assert!(
                matches!(result, Err(Error::EmptyResponse)),
                "expected EmptyResponse for {value}"
            );
        }
    }

    #[test]
    fn test_non_empty_values_pass_through() {
        let value = json!({"title": "t"});
        assert_eq!(unwrap(value.clone(), "status", "results").unwrap(), value);

        // Non-mapping payloads are left alone entirely.
        assert_eq!(unwrap(json!([1, 2]), "status", "results").unwrap(), json!([1, 2]));
        assert_eq!(unwrap(json!(7), "status", "results").unwrap(), json!(7));
    }

    #[test]
    fn test_status_key_without_handler_is_an_error() {
        let value = json!({"custom_error": "200", "title": "t"});
        let result = unwrap(value, "custom_error", "results");
        match result {
            Err(Error::Status { code, body }) => {
                assert_eq!(code, json!("200"));
                assert_eq!(body["title"], json!("t"));
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[test]
    fn test_status_handler_consumes_the_signal() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        let handler: StatusHandler = Arc::new(move |code, body| {
            assert_eq!(code, &json!(42));
            assert!(body.get("results").is_some());
            seen_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let value = json!({"status": 42, "results": [1, 2, 3]});
        let result = unwrap_json(value, URL, "status", "results", Some(&handler)).unwrap();

        // The handler consumed the code AND results unwrapping still ran.
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(result, json!([1, 2, 3]));
    }

    #[test]
    fn test_status_handler_may_abort() {
        let handler: StatusHandler =
            Arc::new(|code, _| Err(Error::Handler(format!("code {code}"))));

        let value = json!({"status": 500});
        let result = unwrap_json(value, URL, "status", "results", Some(&handler));
        assert!(matches!(result, Err(Error::Handler(_))));
    }

    #[test]
    fn test_results_unwrapping_without_status() {
        let value = json!({"results": {"title": "t"}});
        assert_eq!(
            unwrap(value, "status", "results").unwrap(),
            json!({"title": "t"})
        );
    }

    #[test]
    fn test_custom_results_key() {
        let value = json!({"content": "The beat goes round and round"});
        assert_eq!(
            unwrap(value, "status", "content").unwrap(),
            json!("The beat goes round and round")
        );
    }
}

//! Call-time arguments and the route-fill / pass-through split.
//!
//! Named arguments whose key matches a route placeholder are consumed by
//! URL substitution; everything else is forwarded to the transport as a
//! query parameter. The split is a partition: every key lands on exactly
//! one side.

use crate::route::RouteTemplate;
use serde_json::Value;
use std::collections::BTreeMap;

/// Arguments for a single endpoint invocation.
///
/// # Examples
///
/// ```no_run
/// use tinyclient::CallArgs;
/// use serde_json::json;
///
/// # fn example() -> tinyclient::Result<()> {
/// let args = CallArgs::new()
///     .arg("user_id", "42")        // fills {user_id} if the route declares it
///     .arg("page", "2")            // otherwise forwarded as ?page=2
///     .header("X-Request-Id", "abc")
///     .body(&json!({"title": "My Note"}))?
///     .extra(json!("passed to the endpoint handler"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    values: BTreeMap<String, String>,
    body: Option<Value>,
    headers: Vec<(String, String)>,
    extra: Vec<Value>,
}

impl CallArgs {
    /// Creates an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named argument. Route placeholders consume matching keys;
    /// the rest become query parameters.
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Sets a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if `body` cannot be
    /// serialized.
    pub fn body(mut self, body: &impl serde::Serialize) -> crate::Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Adds a request header for this call only.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends a leftover positional value, handed to the endpoint handler
    /// after the interpreted response.
    pub fn extra(mut self, value: impl Into<Value>) -> Self {
        self.extra.push(value.into());
        self
    }

    /// Partitions the named arguments against `route` into route-fill and
    /// pass-through sets.
    pub(crate) fn split(self, route: &RouteTemplate) -> SplitArgs {
        let mut route_fill = BTreeMap::new();
        let mut passthrough = BTreeMap::new();
        for (key, value) in self.values {
            if route.has_field(&key) {
                route_fill.insert(key, value);
            } else {
                passthrough.insert(key, value);
            }
        }
        SplitArgs {
            route_fill,
            passthrough,
            body: self.body,
            headers: self.headers,
            extra: self.extra,
        }
    }
}

/// The result of splitting [`CallArgs`] against a route template.
#[derive(Debug)]
pub(crate) struct SplitArgs {
    pub route_fill: BTreeMap<String, String>,
    pub passthrough: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub extra: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_partitions_every_key() {
        let route = RouteTemplate::parse("/users/{user_id}/posts/{post_id}").unwrap();
        let args = CallArgs::new()
            .arg("user_id", "1")
            .arg("post_id", "2")
            .arg("page", "3")
            .arg("limit", "10");

        let original: Vec<String> = args.values.keys().cloned().collect();
        let split = args.split(&route);

        let mut recovered: Vec<String> = split
            .route_fill
            .keys()
            .chain(split.passthrough.keys())
            .cloned()
            .collect();
        recovered.sort();
        assert_eq!(recovered, original);

        assert_eq!(split.route_fill.len(), 2);
        assert_eq!(split.passthrough.len(), 2);
        assert!(split.route_fill.contains_key("user_id"));
        assert!(split.passthrough.contains_key("page"));
    }

    #[test]
    fn test_split_declared_but_absent_placeholder() {
        let route = RouteTemplate::parse("/users/{user_id}").unwrap();
        let split = CallArgs::new().arg("page", "1").split(&route);

        // user_id was never supplied, so it simply is not a key anywhere.
        assert!(split.route_fill.is_empty());
        assert_eq!(split.passthrough.len(), 1);
    }

    #[test]
    fn test_split_keeps_body_headers_and_extras() {
        let route = RouteTemplate::parse("/notes").unwrap();
        let split = CallArgs::new()
            .body(&serde_json::json!({"title": "t"}))
            .unwrap()
            .header("X-Test", "1")
            .extra(serde_json::json!(42))
            .split(&route);

        assert!(split.body.is_some());
        assert_eq!(split.headers.len(), 1);
        assert_eq!(split.extra, vec![serde_json::json!(42)]);
    }
}

//! Route templates and final URL assembly.
//!
//! A [`RouteTemplate`] is a URL path fragment with named `{placeholder}`
//! tokens, parsed once at declaration time and reused for every call.
//! Substitution is deliberately "safe": a placeholder whose name is absent
//! from the argument set resolves to the empty string rather than an error,
//! which is what makes trailing optional path parameters work.

use crate::{Error, Result};
use std::collections::BTreeMap;

/// A parsed URL path template with named placeholders.
///
/// # Examples
///
/// ```
/// use tinyclient::RouteTemplate;
/// use std::collections::BTreeMap;
///
/// let route = RouteTemplate::parse("/users/{user_id}/posts/{post_id}").unwrap();
/// assert_eq!(route.fields().collect::<Vec<_>>(), vec!["user_id", "post_id"]);
///
/// let mut args = BTreeMap::new();
/// args.insert("user_id".to_string(), "42".to_string());
/// // post_id is absent, so it resolves to the empty string
/// assert_eq!(route.fill(&args), "/users/42/posts/");
/// ```
#[derive(Debug, Clone)]
pub struct RouteTemplate {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

impl RouteTemplate {
    /// Parses a route string into literal and placeholder segments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an unterminated `{`, an empty
    /// placeholder name, or a placeholder name that appears twice. Duplicate
    /// names would make substitution ambiguous, so they are rejected at
    /// declaration time.
    pub fn parse(route: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut seen: Vec<String> = Vec::new();
        let mut chars = route.chars();

        while let Some(c) = chars.next() {
            if c != '{' {
                literal.push(c);
                continue;
            }

            let mut name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                name.push(c);
            }
            if !closed {
                return Err(Error::Configuration(format!(
                    "unterminated placeholder in route '{route}'"
                )));
            }
            if name.is_empty() {
                return Err(Error::Configuration(format!(
                    "empty placeholder name in route '{route}'"
                )));
            }
            if seen.contains(&name) {
                return Err(Error::Configuration(format!(
                    "duplicate placeholder '{{{name}}}' in route '{route}'"
                )));
            }

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            seen.push(name.clone());
            segments.push(Segment::Placeholder(name));
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: route.to_string(),
            segments,
        })
    }

    /// The original route string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in encounter order. Names are unique per route,
    /// so this is also the set of route-fill argument names.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Returns `true` if `name` is one of this route's placeholders.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields().any(|field| field == name)
    }

    /// Substitutes placeholders from `values`, resolving absent names to
    /// the empty string.
    pub fn fill(&self, values: &BTreeMap<String, String>) -> String {
        let mut out = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    if let Some(value) = values.get(name) {
                        out.push_str(value);
                    }
                }
            }
        }
        out
    }
}

/// Assembles the final request URL for one call.
///
/// The base URL template may contain a `{version}` placeholder, replaced by
/// the endpoint's declared version. The filled route is appended to the
/// resolved base when `apply_prefix` is set, or used alone otherwise, and
/// exactly one trailing `/` is stripped from the result.
///
/// # Errors
///
/// Returns [`Error::NoUrl`] when `apply_prefix` is set and `base` is `None`.
pub fn build_url(
    base: Option<&str>,
    version: u32,
    route: &RouteTemplate,
    route_fill: &BTreeMap<String, String>,
    apply_prefix: bool,
) -> Result<String> {
    let path = route.fill(route_fill);
    let mut url = if apply_prefix {
        let base = base.ok_or(Error::NoUrl)?;
        let resolved = base.replace("{version}", &version.to_string());
        format!("{resolved}{path}")
    } else {
        path
    };
    if url.ends_with('/') {
        url.pop();
    }
    Ok(url)
}

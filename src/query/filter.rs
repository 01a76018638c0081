//! Label-selector filters and comma-join rules
//!
//! A [`MetricFilter`] holds one or more raw PromQL label-matcher fragments
//! (e.g. `http_route=~"/api/.*"`). Fragments are joined with a comma in the
//! order the caller supplied them. An absent or empty filter is the identity
//! element for joining: it contributes nothing, so a rendered selector never
//! contains `{}`, a leading comma, a trailing comma, or a doubled comma.

use serde::{Deserialize, Serialize};

/// An ordered label-selector fragment for PromQL queries.
///
/// # Example
///
/// ```rust
/// use sloscope::query::MetricFilter;
///
/// let filter = MetricFilter::new(r#"http_route=~"/api/.*""#)
///     .and(r#"region="us-east-1""#);
/// assert_eq!(filter.as_str(), r#"http_route=~"/api/.*",region="us-east-1""#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricFilter {
    selector: String,
}

impl MetricFilter {
    /// Create a filter from a single raw fragment.
    ///
    /// An empty or whitespace-only fragment produces an empty filter, which
    /// joins as the identity.
    pub fn new(fragment: impl Into<String>) -> Self {
        let fragment = fragment.into();
        Self {
            selector: fragment.trim().to_string(),
        }
    }

    /// Append another fragment, preserving supply order.
    ///
    /// Empty fragments are skipped so the selector never gains a dangling
    /// comma.
    pub fn and(mut self, fragment: &str) -> Self {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return self;
        }
        if self.selector.is_empty() {
            self.selector = fragment.to_string();
        } else {
            self.selector.push(',');
            self.selector.push_str(fragment);
        }
        self
    }

    /// Whether this filter contributes any matchers.
    pub fn is_empty(&self) -> bool {
        self.selector.is_empty()
    }

    /// The joined matcher list, without surrounding braces.
    pub fn as_str(&self) -> &str {
        &self.selector
    }
}

/// Join matcher fragments with commas, skipping empty parts.
///
/// Caller order is preserved exactly (stable, never sorted).
pub(crate) fn join_matchers(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    debug_assert!(
        !joined.starts_with(',') && !joined.ends_with(',') && !joined.contains(",,"),
        "matcher join produced a malformed selector: {joined}"
    );
    joined
}

/// Render a brace-wrapped selector, or nothing when there are no matchers.
pub(crate) fn selector(matchers: &str) -> String {
    if matchers.is_empty() {
        String::new()
    } else {
        format!("{{{matchers}}}")
    }
}

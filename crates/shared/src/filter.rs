use std::collections::HashSet;

use serde_json::json;

/// Property the highlight filter tests.
pub const FILTER_PROPERTY: &str = "listing_url";

/// Inclusion predicate over `listing_url` for the highlight overlay.
///
/// Holds the selected keys in the order they were collected, plus a set
/// for lookups. An empty filter matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HighlightFilter {
    urls: Vec<String>,
    lookup: HashSet<String>,
}

impl HighlightFilter {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn including(urls: Vec<String>) -> Self {
        let lookup = urls.iter().cloned().collect();
        HighlightFilter { urls, lookup }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn matches(&self, url: &str) -> bool {
        self.lookup.contains(url)
    }

    /// Legacy `["in", "listing_url", ...]` expression. An empty selection
    /// is written with a single `""` operand so it still matches nothing.
    pub fn to_expression(&self) -> serde_json::Value {
        let mut expr = vec![json!("in"), json!(FILTER_PROPERTY)];
        if self.urls.is_empty() {
            expr.push(json!(""));
        } else {
            expr.extend(self.urls.iter().map(|u| json!(u)));
        }
        serde_json::Value::Array(expr)
    }
}

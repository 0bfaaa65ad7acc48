//! Query-string parameters for roster requests.

/// Ordered `key=value` pairs appended to a request URL.
///
/// The API pages by `limit`; only the first page is ever read, so callers
/// that need more rows raise the limit rather than follow links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
  pairs: Vec<(String, String)>,
}

impl Query {
  pub fn new() -> Self { Self::default() }

  pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
    self.pairs.push((key.into(), value.to_string()));
    self
  }

  /// Add a `filter` expression, e.g. `email!=''`.
  pub fn filter(self, expression: impl ToString) -> Self {
    self.param("filter", expression)
  }

  pub fn limit(self, limit: usize) -> Self { self.param("limit", limit) }

  pub fn pairs(&self) -> &[(String, String)] { &self.pairs }

  pub fn is_empty(&self) -> bool { self.pairs.is_empty() }
}

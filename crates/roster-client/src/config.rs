//! Connection settings for [`RosterClient`](crate::RosterClient).

use std::{fmt, time::Duration};

/// Where to authenticate, where to fetch from, and with which credentials.
#[derive(Clone)]
pub struct ClientConfig {
  /// OAuth2 token endpoint, e.g. `https://sis.example.com/oauth/token`.
  pub token_url:     String,
  /// Resource root; `/teachers`, `/classes/...` are appended to it.
  pub base_url:      String,
  pub client_id:     String,
  pub client_secret: String,
  /// Applied to every request, including the token exchange.
  pub timeout:       Duration,
}

impl ClientConfig {
  pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

  pub fn new(
    token_url: impl Into<String>,
    base_url: impl Into<String>,
    client_id: impl Into<String>,
    client_secret: impl Into<String>,
  ) -> Self {
    Self {
      token_url:     token_url.into(),
      base_url:      base_url.into(),
      client_id:     client_id.into(),
      client_secret: client_secret.into(),
      timeout:       Self::DEFAULT_TIMEOUT,
    }
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }
}

impl fmt::Debug for ClientConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ClientConfig")
      .field("token_url", &self.token_url)
      .field("base_url", &self.base_url)
      .field("client_id", &self.client_id)
      .field("client_secret", &"<redacted>")
      .field("timeout", &self.timeout)
      .finish()
  }
}

//! Error types for `roster-client`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Build(#[source] reqwest::Error),

  #[error("invalid base URL {0}")]
  BaseUrl(String),

  /// The token exchange failed: unreachable endpoint, non-2xx status, or a
  /// response without a usable bearer token.
  #[error("authentication failed: {0}")]
  Auth(String),

  /// A resource request answered with a non-2xx status.
  #[error("{call} → {status}")]
  Http { call: String, status: StatusCode },

  #[error("{call} failed: {source}")]
  Transport {
    call:   String,
    #[source]
    source: reqwest::Error,
  },

  #[error("{call}: response is not JSON: {source}")]
  InvalidBody {
    call:   String,
    #[source]
    source: serde_json::Error,
  },

  #[error("{call}: {source}")]
  Decode {
    call:   String,
    #[source]
    source: roster_core::Error,
  },
}

impl Error {
  /// The HTTP status of a failed resource request, if that is what failed.
  pub fn status(&self) -> Option<StatusCode> {
    match self {
      Self::Http { status, .. } => Some(*status),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

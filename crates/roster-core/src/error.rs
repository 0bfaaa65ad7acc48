//! Error types for `roster-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A wire object was missing a required field, carried an unrecognised
  /// enum value, or had a field of the wrong shape.
  #[error("failed to decode {kind}: {source}")]
  Decode {
    kind:   &'static str,
    #[source]
    source: serde_json::Error,
  },

  /// A response envelope did not carry the expected top-level array.
  #[error("response has no `{0}` array")]
  MissingCollection(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

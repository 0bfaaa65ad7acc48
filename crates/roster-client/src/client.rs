//! [`RosterClient`] — token exchange and authenticated resource reads.

use std::fmt;

use reqwest::{Client, Url, header::CONTENT_TYPE};
use roster_core::{
  entity::{ClassRecord, Entity, User, decode_collection},
  query::Query,
  source::RosterSource,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{ClientConfig, Error, Result};

// ─── Token ───────────────────────────────────────────────────────────────────

/// Body of a successful client-credentials exchange.
#[derive(Deserialize)]
struct TokenResponse {
  access_token: String,
  #[serde(default)]
  token_type:   Option<String>,
  #[serde(default)]
  expires_in:   Option<u64>,
}

/// A bearer token. Never printed.
#[derive(Clone)]
struct AccessToken(String);

impl fmt::Debug for AccessToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("AccessToken(<redacted>)")
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// An authenticated roster API client.
///
/// Only constructible through a successful token exchange, so every value of
/// this type holds a token. Cheap to clone — the inner [`reqwest::Client`] is
/// `Arc`-based.
#[derive(Debug, Clone)]
pub struct RosterClient {
  http:     Client,
  base_url: Url,
  token:    AccessToken,
}

impl RosterClient {
  /// Build a transport with the configured timeout and authenticate.
  pub async fn connect(config: ClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(Error::Build)?;
    Self::connect_with(http, config).await
  }

  /// Authenticate over a caller-supplied transport.
  pub async fn connect_with(http: Client, config: ClientConfig) -> Result<Self> {
    let base_url = parse_base_url(&config.base_url)?;
    let token = request_token(&http, &config).await?;
    Ok(Self {
      http,
      base_url,
      token,
    })
  }

  pub fn base_url(&self) -> &str { self.base_url.as_str() }

  /// `GET {base}/{segments...}` with the bearer token attached, returning the
  /// JSON body. Each segment is percent-encoded on its own, so an id holding
  /// `/`, `?` or `#` stays a single path segment. Any non-2xx status is an
  /// [`Error::Http`].
  pub async fn get_json(&self, segments: &[&str], query: &Query) -> Result<Value> {
    let call = format!("GET /{}", segments.join("/"));
    debug!(%call, params = query.pairs().len(), "sending request");

    let mut request = self
      .http
      .get(resource_url(&self.base_url, segments)?)
      .bearer_auth(&self.token.0)
      .header(CONTENT_TYPE, "application/json");
    if !query.is_empty() {
      request = request.query(query.pairs());
    }

    let resp = request.send().await.map_err(|source| Error::Transport {
      call: call.clone(),
      source,
    })?;

    let status = resp.status();
    if !status.is_success() {
      return Err(Error::Http { call, status });
    }

    let body = resp.bytes().await.map_err(|source| Error::Transport {
      call: call.clone(),
      source,
    })?;
    serde_json::from_slice(&body).map_err(|source| Error::InvalidBody { call, source })
  }

  async fn get_collection<E: Entity>(
    &self,
    segments: &[&str],
    query: &Query,
    key: &'static str,
  ) -> Result<Vec<E>> {
    let body = self.get_json(segments, query).await?;
    let records = decode_collection(&body, key).map_err(|source| Error::Decode {
      call: format!("GET /{}", segments.join("/")),
      source,
    })?;
    debug!(?segments, count = records.len(), "decoded {}", E::KIND);
    Ok(records)
  }
}

/// Parse the API root. A trailing `/` is dropped so that `base_url()` reads
/// the same however the root was configured.
fn parse_base_url(raw: &str) -> Result<Url> {
  let url = Url::parse(raw.trim_end_matches('/'))
    .map_err(|e| Error::BaseUrl(format!("{raw:?}: {e}")))?;
  if url.cannot_be_a_base() {
    return Err(Error::BaseUrl(format!("{raw:?} cannot carry a path")));
  }
  Ok(url)
}

/// Append `segments` to the path of `base`, percent-encoding each one.
pub(crate) fn resource_url(base: &Url, segments: &[&str]) -> Result<Url> {
  let mut url = base.clone();
  url
    .path_segments_mut()
    .map_err(|()| Error::BaseUrl(format!("{base} cannot carry a path")))?
    .pop_if_empty()
    .extend(segments);
  Ok(url)
}

async fn request_token(http: &Client, config: &ClientConfig) -> Result<AccessToken> {
  debug!(token_url = %config.token_url, client_id = %config.client_id, "requesting access token");

  let resp = http
    .post(&config.token_url)
    .basic_auth(&config.client_id, Some(&config.client_secret))
    .form(&[("grant_type", "client_credentials")])
    .send()
    .await
    .map_err(|e| Error::Auth(format!("token endpoint unreachable: {e}")))?;

  let status = resp.status();
  if !status.is_success() {
    return Err(Error::Auth(format!("token endpoint → {status}")));
  }

  let token: TokenResponse = resp
    .json()
    .await
    .map_err(|e| Error::Auth(format!("malformed token response: {e}")))?;

  if let Some(ref kind) = token.token_type
    && !kind.eq_ignore_ascii_case("bearer")
  {
    return Err(Error::Auth(format!("unsupported token type {kind:?}")));
  }
  if token.access_token.is_empty() {
    return Err(Error::Auth("token response has an empty access_token".into()));
  }

  debug!(expires_in = ?token.expires_in, "obtained access token");
  Ok(AccessToken(token.access_token))
}

// ─── RosterSource impl ───────────────────────────────────────────────────────

impl RosterSource for RosterClient {
  type Error = Error;

  async fn get_all_teachers<'a>(&'a self, query: &'a Query) -> Result<Vec<User>> {
    self.get_collection(&["teachers"], query, "users").await
  }

  async fn get_classes_for_teacher<'a>(
    &'a self,
    teacher_id: &'a str,
    query: &'a Query,
  ) -> Result<Vec<ClassRecord>> {
    self
      .get_collection(&["teachers", teacher_id, "classes"], query, "classes")
      .await
  }

  async fn get_students_for_class<'a>(
    &'a self,
    class_id: &'a str,
    query: &'a Query,
  ) -> Result<Vec<User>> {
    self
      .get_collection(&["classes", class_id, "students"], query, "users")
      .await
  }
}

//! Layered runtime settings: defaults, TOML file, environment, CLI flags.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use roster_client::ClientConfig;
use roster_core::query::Query;
use serde::Deserialize;

/// Everything the sync needs to run. Not `Debug`: it carries the secret.
#[derive(Clone, Deserialize)]
pub struct Settings {
  pub token_url:            String,
  pub base_url:             String,
  pub client_id:            String,
  pub client_secret:        String,
  pub output_dir:           PathBuf,
  /// Sent as `filter=` on the teacher listing; empty sends no filter.
  pub teacher_filter:       String,
  pub page_limit:           usize,
  pub concurrency:          usize,
  pub request_timeout_secs: u64,
}

/// Values given on the command line; they win over every other source.
#[derive(Debug, Default)]
pub struct Overrides {
  pub output_dir:     Option<PathBuf>,
  pub teacher_filter: Option<String>,
  pub page_limit:     Option<usize>,
  pub concurrency:    Option<usize>,
}

/// Environment variables read as settings. Values are taken as strings, so
/// credentials such as `00421` or `1e3` are never reinterpreted as numbers.
const ENV_KEYS: [&str; 9] = [
  "TOKEN_URL",
  "BASE_URL",
  "CLIENT_ID",
  "CLIENT_SECRET",
  "OUTPUT_DIR",
  "TEACHER_FILTER",
  "PAGE_LIMIT",
  "CONCURRENCY",
  "REQUEST_TIMEOUT_SECS",
];

impl Settings {
  pub fn load(config_path: &Path, overrides: &Overrides) -> anyhow::Result<Self> {
    Self::load_from(config_path, overrides, std::env::vars())
  }

  fn load_from(
    config_path: &Path,
    overrides: &Overrides,
    env: impl IntoIterator<Item = (String, String)>,
  ) -> anyhow::Result<Self> {
    let env: config::Map<String, String> = env
      .into_iter()
      .filter(|(key, _)| ENV_KEYS.contains(&key.as_str()))
      .collect();

    let settings = config::Config::builder()
      .set_default("output_dir", "output_data")?
      .set_default("teacher_filter", "email!=''")?
      .set_default("page_limit", 1000_u64)?
      .set_default("concurrency", 1_u64)?
      .set_default("request_timeout_secs", 30_u64)?
      .add_source(config::File::from(config_path).required(false))
      .add_source(config::Environment::default().source(Some(env)))
      .set_override_option(
        "output_dir",
        overrides
          .output_dir
          .as_ref()
          .map(|dir| dir.to_string_lossy().into_owned()),
      )?
      .set_override_option("teacher_filter", overrides.teacher_filter.clone())?
      .set_override_option("page_limit", overrides.page_limit.map(|n| n as u64))?
      .set_override_option("concurrency", overrides.concurrency.map(|n| n as u64))?
      .build()
      .with_context(|| format!("failed to read {}", config_path.display()))?;

    settings.try_deserialize().context(
      "invalid settings (TOKEN_URL, BASE_URL, CLIENT_ID and CLIENT_SECRET are required)",
    )
  }

  pub fn client_config(&self) -> ClientConfig {
    ClientConfig::new(
      &self.token_url,
      &self.base_url,
      &self.client_id,
      &self.client_secret,
    )
    .with_timeout(Duration::from_secs(self.request_timeout_secs))
  }

  pub fn teacher_query(&self) -> Query {
    let query = Query::new();
    let query = if self.teacher_filter.is_empty() {
      query
    } else {
      query.filter(&self.teacher_filter)
    };
    query.limit(self.page_limit)
  }
}

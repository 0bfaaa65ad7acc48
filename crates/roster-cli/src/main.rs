//! `roster-sync` — fetch teachers, their classes and students from a roster
//! API and write them out in three buckets.
//!
//! # Usage
//!
//! ```text
//! roster-sync --config roster.toml --output-dir output_data
//! TOKEN_URL=... BASE_URL=... CLIENT_ID=... CLIENT_SECRET=... roster-sync
//! ```
//!
//! A `.env` file in the working directory is loaded first if present.

mod output;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use output::JsonDirWriter;
use roster_client::RosterClient;
use roster_core::classify::Classifier;
use settings::{Overrides, Settings};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Classify roster teachers by classes and students")]
struct Cli {
  /// Path to an optional TOML settings file.
  #[arg(short, long, default_value = "roster.toml")]
  config: PathBuf,

  /// Directory the three bucket files are written to.
  #[arg(short, long, value_name = "DIR")]
  output_dir: Option<PathBuf>,

  /// Filter expression for the teacher listing (empty for none).
  #[arg(long)]
  filter: Option<String>,

  /// Page size requested for the teacher listing.
  #[arg(long)]
  limit: Option<usize>,

  /// Number of teachers walked at once.
  #[arg(short = 'j', long)]
  concurrency: Option<usize>,
}

impl Cli {
  fn overrides(&self) -> Overrides {
    Overrides {
      output_dir:     self.output_dir.clone(),
      teacher_filter: self.filter.clone(),
      page_limit:     self.limit,
      concurrency:    self.concurrency,
    }
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  if let Ok(path) = dotenvy::dotenv() {
    tracing::debug!("loaded environment from {}", path.display());
  }

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config, &cli.overrides())?;

  let client = RosterClient::connect(settings.client_config())
    .await
    .context("failed to authenticate against the roster API")?;

  tracing::info!(base_url = %client.base_url(), "fetching data");
  let report = Classifier::new(client)
    .with_teacher_query(settings.teacher_query())
    .with_concurrency(settings.concurrency)
    .run()
    .await
    .context("failed to fetch roster data")?;

  // Only reached once every request succeeded, so nothing is written for a
  // failed run.
  let mut writer = JsonDirWriter::create(&settings.output_dir)?;
  report
    .persist(&mut writer)
    .context("failed to persist classified teachers")?;

  println!("Data fetched and persisted successfully to the following files:");
  for path in writer.written() {
    println!("* {}", path.display());
  }
  Ok(())
}

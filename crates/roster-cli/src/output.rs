//! [`JsonDirWriter`] — persists each bucket as a pretty-printed JSON file.

use std::{
  fs, io,
  path::{Path, PathBuf},
};

use roster_core::report::{Bucket, ReportWriter};
use serde::Serialize as _;
use serde_json::{Value, ser::PrettyFormatter};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
  #[error("failed to create {}: {source}", path.display())]
  CreateDir {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write {}: {source}", path.display())]
  Write {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to serialise {bucket}: {source}")]
  Serialize {
    bucket: Bucket,
    #[source]
    source: serde_json::Error,
  },
}

/// Writes `<dir>/<bucket>.json` with four-space indentation and a trailing
/// newline. Documents are staged as sibling `.json.tmp` files and only
/// renamed into place on [`commit`](ReportWriter::commit), after every bucket
/// was staged. A failed write removes what was staged so far.
#[derive(Debug)]
pub struct JsonDirWriter {
  dir:     PathBuf,
  /// `(staging, final)` pairs awaiting commit.
  staged:  Vec<(PathBuf, PathBuf)>,
  written: Vec<PathBuf>,
}

impl JsonDirWriter {
  /// Create `dir` (and parents) if it does not exist yet.
  pub fn create(dir: impl AsRef<Path>) -> Result<Self, WriteError> {
    let dir = dir.as_ref().to_path_buf();
    fs::create_dir_all(&dir).map_err(|source| WriteError::CreateDir {
      path: dir.clone(),
      source,
    })?;
    Ok(Self { dir, staged: Vec::new(), written: Vec::new() })
  }

  pub fn path_for(&self, bucket: Bucket) -> PathBuf {
    self.dir.join(format!("{}.json", bucket.name()))
  }

  /// Paths committed so far, in write order.
  pub fn written(&self) -> &[PathBuf] { &self.written }

  fn discard_staged(&mut self) {
    for (staging, _) in self.staged.drain(..) {
      if let Err(e) = fs::remove_file(&staging) {
        tracing::warn!(path = %staging.display(), "failed to remove staged file: {e}");
      }
    }
  }
}

impl ReportWriter for JsonDirWriter {
  type Error = WriteError;

  fn write(&mut self, bucket: Bucket, document: &Value) -> Result<(), WriteError> {
    let mut buf = Vec::new();
    let mut serializer =
      serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    if let Err(source) = document.serialize(&mut serializer) {
      self.discard_staged();
      return Err(WriteError::Serialize { bucket, source });
    }
    buf.push(b'\n');

    let path = self.path_for(bucket);
    let staging = path.with_extension("json.tmp");
    if let Err(source) = fs::write(&staging, &buf) {
      self.discard_staged();
      return Err(WriteError::Write { path: staging, source });
    }

    tracing::debug!(path = %staging.display(), bytes = buf.len(), "staged bucket");
    self.staged.push((staging, path));
    Ok(())
  }

  fn commit(&mut self) -> Result<(), WriteError> {
    for (staging, path) in std::mem::take(&mut self.staged) {
      fs::rename(&staging, &path)
        .map_err(|source| WriteError::Write { path: path.clone(), source })?;
      tracing::debug!(path = %path.display(), "wrote bucket");
      self.written.push(path);
    }
    Ok(())
  }
}

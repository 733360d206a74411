//! The per-run change history.
//!
//! Format, one line per processed descriptor, then a blank line and totals:
//!
//! ```text
//! Changed: /src/App/App.csproj
//! Unchanged: /src/Lib/Lib.csproj
//!
//! Total files changed: 1
//! Total files unchanged: 1
//! ```
//!
//! Descriptors that could not be processed are written as
//! `Failed: <path> (<reason>)` and add a `Total files failed` line.

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{RelinkError, Result};

/// What happened to one descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileOutcome {
  Changed,
  Unchanged,
  Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
  pub path: PathBuf,
  #[serde(flatten)]
  pub outcome: FileOutcome,
}

/// Aggregate result of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
  pub report_path: PathBuf,
  pub dry_run: bool,
  pub changed: usize,
  pub unchanged: usize,
  pub failed: usize,
  pub files: Vec<FileRecord>,
}

impl RunSummary {
  pub fn new(report_path: PathBuf, dry_run: bool) -> Self {
    Self {
      report_path,
      dry_run,
      ..Default::default()
    }
  }

  pub fn record(&mut self, path: PathBuf, outcome: FileOutcome) {
    match outcome {
      FileOutcome::Changed => self.changed += 1,
      FileOutcome::Unchanged => self.unchanged += 1,
      FileOutcome::Failed { .. } => self.failed += 1,
    }
    self.files.push(FileRecord { path, outcome });
  }

  pub fn total(&self) -> usize {
    self.files.len()
  }
}

/// Format the report line for one descriptor.
pub fn format_line(path: &Path, outcome: &FileOutcome) -> String {
  match outcome {
    FileOutcome::Changed => format!("Changed: {}", path.display()),
    FileOutcome::Unchanged => format!("Unchanged: {}", path.display()),
    FileOutcome::Failed { reason } => format!("Failed: {} ({})", path.display(), reason),
  }
}

/// Streams report lines to a sink, flushing after each one so an interrupted
/// run still leaves a readable report.
pub struct ReportWriter<W: Write> {
  out: W,
  path: PathBuf,
}

impl ReportWriter<BufWriter<File>> {
  /// Create (or truncate) the report file.
  pub fn create(path: &Path) -> Result<Self> {
    let file = File::create(path).map_err(|e| RelinkError::io(path, e))?;
    Ok(Self::new(BufWriter::new(file), path))
  }
}

impl<W: Write> ReportWriter<W> {
  pub fn new(out: W, path: &Path) -> Self {
    Self {
      out,
      path: path.to_path_buf(),
    }
  }

  fn line(&mut self, line: &str) -> Result<()> {
    writeln!(self.out, "{line}")
      .and_then(|_| self.out.flush())
      .map_err(|e| RelinkError::io(&self.path, e))
  }

  /// Append the line for one processed descriptor.
  pub fn record(&mut self, path: &Path, outcome: &FileOutcome) -> Result<()> {
    self.line(&format_line(path, outcome))
  }

  /// Write the totals and hand back the sink.
  pub fn finish(mut self, summary: &RunSummary) -> Result<W> {
    self.line("")?;
    self.line(&format!("Total files changed: {}", summary.changed))?;
    self.line(&format!("Total files unchanged: {}", summary.unchanged))?;
    if summary.failed > 0 {
      self.line(&format!("Total files failed: {}", summary.failed))?;
    }
    Ok(self.out)
  }
}

//! Run orchestration: discovery, per-file transform, conditional save, report.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::DiscoveryConfig;
use crate::discovery::discover;
use crate::document::Document;
use crate::error::Result;
use crate::report::{FileOutcome, ReportWriter, RunSummary};
use crate::transform::{MetadataCache, MetadataSource, RewriteOptions, transform_document};

/// Everything a run needs besides the root directory.
#[derive(Debug, Clone)]
pub struct RunOptions {
  pub rewrite: RewriteOptions,
  pub discovery: DiscoveryConfig,
  pub report_path: PathBuf,
  /// Transform and report, but never write descriptors back.
  pub dry_run: bool,
}

impl RunOptions {
  pub fn new(report_path: impl Into<PathBuf>) -> Self {
    Self {
      rewrite: RewriteOptions::default(),
      discovery: DiscoveryConfig::default(),
      report_path: report_path.into(),
      dry_run: false,
    }
  }
}

/// Progress callbacks, e.g. for console output.
pub trait RunObserver {
  fn file_started(&mut self, _path: &Path) {}
  fn file_finished(&mut self, _path: &Path, _outcome: &FileOutcome) {}
}

/// Observer that ignores everything.
pub struct Quiet;

impl RunObserver for Quiet {}

/// Process every descriptor under `root` and write the report.
///
/// An invalid root fails before the report is opened. Descriptors that fail
/// to load or save are reported as failed and the run continues.
pub fn run<O: RunObserver>(root: &Path, options: &RunOptions, observer: &mut O) -> Result<RunSummary> {
  let files = discover(root, &options.discovery)?;

  let mut report = ReportWriter::create(&options.report_path)?;
  let mut metadata = MetadataCache::new();
  let mut summary = RunSummary::new(options.report_path.clone(), options.dry_run);

  for path in files {
    debug!("Processing {:?}", path);
    observer.file_started(&path);

    let outcome = match process_file(&path, options, &mut metadata) {
      Ok(true) => FileOutcome::Changed,
      Ok(false) => FileOutcome::Unchanged,
      Err(e) if e.is_per_file() => {
        warn!("Failed to process {:?}: {}", path, e);
        FileOutcome::Failed { reason: e.reason() }
      }
      Err(e) => return Err(e),
    };

    report.record(&path, &outcome)?;
    observer.file_finished(&path, &outcome);
    summary.record(path, outcome);
  }

  report.finish(&summary)?;
  debug!(
    "Run finished: {} changed, {} unchanged, {} failed",
    summary.changed, summary.unchanged, summary.failed
  );
  Ok(summary)
}

/// Load, transform and (unless dry-running) save one descriptor.
/// Returns whether it changed.
pub fn process_file<M: MetadataSource>(path: &Path, options: &RunOptions, metadata: &mut M) -> Result<bool> {
  let mut document = Document::load(path)?;
  let outcome = transform_document(&mut document, path, &options.rewrite, metadata);

  if outcome.changed() && !options.dry_run {
    document.save(path)?;
  }
  Ok(outcome.changed())
}

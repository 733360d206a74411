//! Per-descriptor rewrites.
//!
//! Both transforms take the document by `&mut` and report whether they
//! changed anything; saving is left to the caller.

mod hint_path;
mod project_reference;

pub use hint_path::{HINT_PATH, rewrite_hint_paths};
pub use project_reference::{
  MetadataCache, MetadataSource, OutputKind, PROJECT_REFERENCE, ProjectMetadata, REFERENCE, rewrite_project_references,
};

use std::path::{MAIN_SEPARATOR, Path};

use crate::ABSOLUTE_PREFIX;
use crate::document::Document;

/// Parameters threaded into every transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
  /// Absolute prefix whose hint paths get relativized.
  pub absolute_prefix: String,
  /// Separator used in rewritten paths.
  pub separator: char,
}

impl Default for RewriteOptions {
  fn default() -> Self {
    Self {
      absolute_prefix: ABSOLUTE_PREFIX.to_string(),
      separator: MAIN_SEPARATOR,
    }
  }
}

impl RewriteOptions {
  pub fn with_prefix(prefix: impl Into<String>) -> Self {
    Self {
      absolute_prefix: prefix.into(),
      ..Default::default()
    }
  }

  pub fn separator(mut self, separator: char) -> Self {
    self.separator = separator;
    self
  }
}

/// What the transforms did to one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOutcome {
  pub hint_paths: bool,
  pub project_references: bool,
}

impl TransformOutcome {
  pub fn changed(&self) -> bool {
    self.hint_paths || self.project_references
  }
}

/// Run both transforms over `document`, which was loaded from `descriptor`.
pub fn transform_document<M: MetadataSource>(
  document: &mut Document,
  descriptor: &Path,
  options: &RewriteOptions,
  metadata: &mut M,
) -> TransformOutcome {
  let hint_paths = rewrite_hint_paths(document, descriptor, options);
  let project_references = rewrite_project_references(document, descriptor, options, metadata);
  TransformOutcome {
    hint_paths,
    project_references,
  }
}

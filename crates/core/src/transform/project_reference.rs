//! Turning project-to-project references into binary references.
//!
//! A `ProjectReference` names another descriptor. It is replaced by a
//! `Reference` to that project's expected build output, which is assumed to
//! live at `<referenced dir>\bin\<AssemblyName>.<dll|exe>`. Nothing checks the
//! real build output.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{HINT_PATH, RewriteOptions};
use crate::document::{Document, Element, Node};
use crate::paths::{LexicalPath, relative_path};

pub const PROJECT_REFERENCE: &str = "ProjectReference";
pub const REFERENCE: &str = "Reference";

const INCLUDE: &str = "Include";
const ASSEMBLY_NAME: &str = "AssemblyName";
const OUTPUT_TYPE: &str = "OutputType";
const OUTPUT_DIR: &str = "bin";

/// Build output kind declared by a descriptor's `OutputType`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputKind {
  #[default]
  Library,
  Executable,
}

impl OutputKind {
  /// `Exe` and `WinExe` build executables; everything else is a library.
  pub fn from_output_type(value: &str) -> Self {
    let value = value.trim();
    if value.eq_ignore_ascii_case("exe") || value.eq_ignore_ascii_case("winexe") {
      Self::Executable
    } else {
      Self::Library
    }
  }

  pub fn extension(self) -> &'static str {
    match self {
      Self::Library => "dll",
      Self::Executable => "exe",
    }
  }
}

/// Assembly facts read from a referenced descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMetadata {
  pub assembly_name: String,
  pub output_kind: OutputKind,
}

impl ProjectMetadata {
  /// Defaults used when the descriptor declares nothing (or cannot be read).
  pub fn fallback(descriptor: &LexicalPath) -> Self {
    Self {
      assembly_name: descriptor.file_stem().unwrap_or_default().to_string(),
      output_kind: OutputKind::Library,
    }
  }

  /// Read the first `AssemblyName` and `OutputType` in the document.
  pub fn from_document(document: &Document, descriptor: &LexicalPath) -> Self {
    let fallback = Self::fallback(descriptor);
    let assembly_name = document
      .root
      .find_descendant(ASSEMBLY_NAME)
      .map(|e| e.text().trim().to_string())
      .filter(|name| !name.is_empty())
      .unwrap_or(fallback.assembly_name);
    let output_kind = document
      .root
      .find_descendant(OUTPUT_TYPE)
      .map(|e| OutputKind::from_output_type(&e.text()))
      .unwrap_or_default();

    Self {
      assembly_name,
      output_kind,
    }
  }

  pub fn output_file_name(&self) -> String {
    format!("{}.{}", self.assembly_name, self.output_kind.extension())
  }
}

/// Where a transform gets referenced-descriptor metadata from.
pub trait MetadataSource {
  fn metadata(&mut self, descriptor: &LexicalPath) -> ProjectMetadata;
}

/// Reads referenced descriptors from disk, once per path per run.
#[derive(Debug, Default)]
pub struct MetadataCache {
  entries: HashMap<PathBuf, ProjectMetadata>,
}

impl MetadataCache {
  pub fn new() -> Self {
    Self::default()
  }
}

impl MetadataSource for MetadataCache {
  fn metadata(&mut self, descriptor: &LexicalPath) -> ProjectMetadata {
    let path = descriptor.to_path_buf();
    if let Some(cached) = self.entries.get(&path) {
      return cached.clone();
    }

    let metadata = match Document::load(&path) {
      Ok(document) => ProjectMetadata::from_document(&document, descriptor),
      Err(e) => {
        warn!("Could not read referenced project, using defaults: {}", e);
        ProjectMetadata::fallback(descriptor)
      }
    };
    debug!("Metadata for {:?}: {:?}", path, metadata);
    self.entries.insert(path, metadata.clone());
    metadata
  }
}

/// Replace `ProjectReference` elements with binary `Reference` elements.
///
/// Each element holding project references is handled on its own. Within it,
/// a reference whose `HintPath` child already matches the computed output
/// path is kept; every other one is replaced in place. Containers with no
/// stale reference are not touched, and a document without project
/// references is left as is.
pub fn rewrite_project_references<M: MetadataSource>(
  document: &mut Document,
  descriptor: &Path,
  options: &RewriteOptions,
  metadata: &mut M,
) -> bool {
  let Some(anchor) = LexicalPath::from_path(descriptor).parent() else {
    return false;
  };

  let mut updated = false;
  document.root.visit_mut(&mut |container| {
    if container.elements().any(|e| e.is(PROJECT_REFERENCE)) {
      updated |= rewrite_container(container, &anchor, options, metadata);
    }
  });
  updated
}

fn rewrite_container<M: MetadataSource>(
  container: &mut Element,
  anchor: &LexicalPath,
  options: &RewriteOptions,
  metadata: &mut M,
) -> bool {
  let mut replacements: Vec<(usize, Element)> = Vec::new();

  for (index, node) in container.children.iter().enumerate() {
    let Node::Element(reference) = node else {
      continue;
    };
    if !reference.is(PROJECT_REFERENCE) {
      continue;
    }
    let Some(include) = reference.attribute(INCLUDE).map(str::trim).filter(|s| !s.is_empty()) else {
      continue;
    };

    let referenced = anchor.join(include);
    let project = metadata.metadata(&referenced);
    let Some(output) = referenced.parent().map(|dir| dir.join(OUTPUT_DIR).join(&project.output_file_name())) else {
      continue;
    };
    let Some(relative) = relative_path(anchor, &output, options.separator) else {
      warn!("ProjectReference {} has no relative form from {}, left unchanged", include, anchor.render('/'));
      continue;
    };

    let current = reference.child(HINT_PATH).map(Element::text);
    if current.as_deref() == Some(relative.as_str()) {
      continue;
    }

    info!("Replaced ProjectReference: {} => {} ({})", include, relative, project.assembly_name);
    let replacement = binary_reference(&project.assembly_name, &relative, container.leading_whitespace(index));
    replacements.push((index, replacement));
  }

  if replacements.is_empty() {
    return false;
  }
  for (index, replacement) in replacements {
    container.children[index] = Node::Element(replacement);
  }
  true
}

/// `<Reference Include="name"><HintPath>path</HintPath></Reference>`, indented
/// one level deeper than the element it replaces when that indent is known.
fn binary_reference(assembly_name: &str, relative: &str, leading: Option<&str>) -> Element {
  let mut hint = Element::new(HINT_PATH);
  hint.set_text(relative);

  let mut reference = Element::new(REFERENCE).with_attribute(INCLUDE, assembly_name);
  match leading.and_then(|ws| ws.rfind('\n').map(|i| &ws[i..])) {
    Some(line) => {
      reference.push(Node::Whitespace(format!("{line}  ")));
      reference.push(Node::Element(hint));
      reference.push(Node::Whitespace(line.to_string()));
    }
    None => reference.push(Node::Element(hint)),
  }
  reference
}

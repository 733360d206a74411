//! Error types for descriptor discovery, parsing and rewriting.

use std::path::PathBuf;

/// Errors produced while relinking descriptors.
#[derive(Debug, thiserror::Error)]
pub enum RelinkError {
  /// The root directory supplied by the user is empty or not a directory.
  #[error("Invalid input: {0}")]
  InvalidInput(String),
  /// A descriptor could not be parsed as XML.
  #[error("Malformed document {path:?}: {source}")]
  MalformedDocument {
    path: PathBuf,
    #[source]
    source: crate::document::ParseError,
  },
  /// Reading or writing a file failed.
  #[error("I/O error on {path:?}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  /// Serializing a document back to XML failed.
  #[error("Error writing XML data: {0}")]
  WriteXml(#[from] xml::writer::Error),
  /// A config file exists but could not be parsed.
  #[error("Config error in {path:?}: {message}")]
  Config { path: PathBuf, message: String },
}

impl RelinkError {
  pub fn invalid_input(msg: impl Into<String>) -> Self {
    Self::InvalidInput(msg.into())
  }

  pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }

  /// True for errors that only affect a single descriptor, so a run can
  /// record the failure and move on.
  pub fn is_per_file(&self) -> bool {
    matches!(self, Self::MalformedDocument { .. } | Self::Io { .. } | Self::WriteXml(_))
  }

  /// The underlying cause without the path, for lines that already name the file.
  pub fn reason(&self) -> String {
    match std::error::Error::source(self) {
      Some(source) => source.to_string(),
      None => self.to_string(),
    }
  }
}

pub type Result<T> = std::result::Result<T, RelinkError>;

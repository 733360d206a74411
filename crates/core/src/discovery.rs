//! Finding descriptor files under a root directory.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::DiscoveryConfig;
use crate::error::{RelinkError, Result};

/// Check the `*.*proj` pattern: any extension ending in `proj`
/// (`.csproj`, `.vbproj`, `.fsproj`, `.vcxproj`, ...).
pub fn is_descriptor(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| ext.to_ascii_lowercase().ends_with("proj"))
}

/// Reject an empty or non-directory root before any file I/O happens.
pub fn validate_root(root: &Path) -> Result<()> {
  if root.as_os_str().is_empty() {
    return Err(RelinkError::invalid_input("root directory is empty"));
  }
  if !root.is_dir() {
    return Err(RelinkError::invalid_input(format!("not a directory: {}", root.display())));
  }
  Ok(())
}

/// Recursively collect descriptor files under `root`, sorted by path.
pub fn discover(root: &Path, config: &DiscoveryConfig) -> Result<Vec<PathBuf>> {
  validate_root(root)?;

  let walker = walkdir::WalkDir::new(root)
    .follow_links(config.follow_links)
    .into_iter()
    .filter_entry(|e| {
      if e.depth() == 0 || !e.file_type().is_dir() {
        return true;
      }
      let name = e.file_name().to_string_lossy();
      !config.exclude_dirs.iter().any(|d| d == name.as_ref())
    });

  let mut files = Vec::new();
  for entry in walker {
    let entry = match entry {
      Ok(entry) => entry,
      Err(e) => {
        warn!("Skipping unreadable entry: {}", e);
        continue;
      }
    };

    if entry.file_type().is_file() && is_descriptor(entry.path()) {
      files.push(entry.into_path());
    }
  }

  files.sort();
  debug!("Discovered {} descriptor files under {:?}", files.len(), root);
  Ok(files)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "<Project />").unwrap();
  }

  #[test]
  fn test_is_descriptor() {
    assert!(is_descriptor(Path::new("App.csproj")));
    assert!(is_descriptor(Path::new("Legacy.VBPROJ")));
    assert!(is_descriptor(Path::new("native.vcxproj")));
    assert!(is_descriptor(Path::new("plain.proj")));
    assert!(!is_descriptor(Path::new("App.csproj.user")));
    assert!(!is_descriptor(Path::new("App.sln")));
    assert!(!is_descriptor(Path::new("csproj")));
  }

  #[test]
  fn test_discover_recurses_and_sorts() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("b/B.vbproj"));
    touch(&dir.path().join("a/deep/nested/A.csproj"));
    touch(&dir.path().join("a/readme.md"));
    touch(&dir.path().join("Root.csproj"));

    let files = discover(dir.path(), &DiscoveryConfig::default()).unwrap();
    let relative: Vec<_> = files.iter().map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf()).collect();
    assert_eq!(
      relative,
      vec![
        PathBuf::from("Root.csproj"),
        PathBuf::from("a/deep/nested/A.csproj"),
        PathBuf::from("b/B.vbproj"),
      ]
    );
  }

  #[test]
  fn test_discover_skips_excluded_dirs() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("src/App.csproj"));
    touch(&dir.path().join("packages/Pkg/Pkg.csproj"));

    let config = DiscoveryConfig {
      exclude_dirs: vec!["packages".to_string()],
      ..Default::default()
    };
    let files = discover(dir.path(), &config).unwrap();
    assert_eq!(files, vec![dir.path().join("src/App.csproj")]);
  }

  #[test]
  fn test_empty_root_is_invalid() {
    let err = discover(Path::new(""), &DiscoveryConfig::default()).unwrap_err();
    assert!(matches!(err, RelinkError::InvalidInput(_)));
  }

  #[test]
  fn test_missing_root_is_invalid() {
    let dir = TempDir::new().unwrap();
    let err = discover(&dir.path().join("missing"), &DiscoveryConfig::default()).unwrap_err();
    assert!(matches!(err, RelinkError::InvalidInput(_)));
  }

  #[test]
  fn test_file_root_is_invalid() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("App.csproj");
    touch(&file);
    let err = discover(&file, &DiscoveryConfig::default()).unwrap_err();
    assert!(matches!(err, RelinkError::InvalidInput(_)));
  }
}

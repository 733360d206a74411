//! Configuration for relink runs.
//!
//! Config priority: root-relative (`.relink.toml`) > user (`~/.config/relink/config.toml`) > defaults.
//!
//! The absolute prefix being eliminated is not part of this file;
//! it is the compile-time [`ABSOLUTE_PREFIX`](crate::ABSOLUTE_PREFIX).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RelinkError, Result};

/// File name of the root-relative config.
pub const PROJECT_CONFIG_FILE: &str = ".relink.toml";

/// Default name of the report written after each run.
pub const DEFAULT_REPORT_FILE: &str = "change_history.txt";

// ============================================================================
// Report Configuration
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
  /// Where to write the run report. Defaults to `change_history.txt` next
  /// to the running executable.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub path: Option<PathBuf>,
}

// ============================================================================
// Discovery Configuration
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
  /// Directory names skipped while walking (e.g. "node_modules", ".git")
  pub exclude_dirs: Vec<String>,

  /// Follow symbolic links while walking
  pub follow_links: bool,
}

// ============================================================================
// Logging Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Log level: error, warn, info, debug, trace
  pub level: String,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
    }
  }
}

// ============================================================================
// Main Configuration
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub report: ReportConfig,

  #[serde(default)]
  pub discovery: DiscoveryConfig,

  #[serde(default)]
  pub logging: LoggingConfig,
}

impl Config {
  /// Load config for a root directory, with fallback to user config.
  ///
  /// A config file that exists but does not parse is an error.
  pub fn load_for_root(root: &Path) -> Result<Self> {
    let project_config = Self::project_config_path(root);
    if project_config.exists() {
      return Self::load_file(&project_config);
    }

    if let Some(user_config) = Self::user_config_path()
      && user_config.exists()
    {
      return Self::load_file(&user_config);
    }

    Ok(Self::default())
  }

  fn load_file(path: &Path) -> Result<Self> {
    let content = std::fs::read_to_string(path).map_err(|e| RelinkError::io(path, e))?;
    toml::from_str(&content).map_err(|e| RelinkError::Config {
      path: path.to_path_buf(),
      message: e.to_string(),
    })
  }

  /// Get the user-level config path
  pub fn user_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("RELINK_CONFIG_DIR") {
      return Some(PathBuf::from(path).join("config.toml"));
    }

    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
      return Some(PathBuf::from(path).join("relink").join("config.toml"));
    }

    dirs::config_dir().map(|p: PathBuf| p.join("relink").join("config.toml"))
  }

  /// Get the root-relative config path
  pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(PROJECT_CONFIG_FILE)
  }

  /// Resolve the report location: explicit config, else next to the executable.
  pub fn report_path(&self) -> PathBuf {
    if let Some(path) = &self.report.path {
      return path.clone();
    }
    std::env::current_exe()
      .ok()
      .and_then(|exe| exe.parent().map(Path::to_path_buf))
      .unwrap_or_else(|| PathBuf::from("."))
      .join(DEFAULT_REPORT_FILE)
  }

  /// Generate a default config file as a string
  pub fn generate_template() -> String {
    r#"# relink configuration
# Place in <root>/.relink.toml (per tree) or ~/.config/relink/config.toml (user)

# ============================================================================
# Report
# ============================================================================

[report]
# Where to write the change history. Defaults to change_history.txt next to
# the relink executable.
# path = "change_history.txt"

# ============================================================================
# Discovery
# ============================================================================

[discovery]
# Directory names to skip while searching for *.*proj files
exclude_dirs = []
# Follow symbolic links while walking
follow_links = false

# ============================================================================
# Logging
# ============================================================================

[logging]
# error, warn, info, debug, trace (RUST_LOG overrides)
level = "info"
"#
    .to_string()
  }
}

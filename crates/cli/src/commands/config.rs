//! Configuration commands

use anyhow::{Context, Result, bail};
use relink_core::Config;
use std::path::PathBuf;

fn root_or_cwd(root: Option<PathBuf>) -> Result<PathBuf> {
  match root {
    Some(root) => Ok(root),
    None => std::env::current_dir().context("Failed to read current directory"),
  }
}

/// Show the effective configuration for a root folder
pub fn cmd_config_show(root: Option<PathBuf>) -> Result<()> {
  let root = root_or_cwd(root)?;
  let config = Config::load_for_root(&root)?;

  let project_config = Config::project_config_path(&root);
  let user_config = Config::user_config_path();

  println!("Effective configuration for: {:?}", root);
  println!();

  if project_config.exists() {
    println!("Using root config: {:?}", project_config);
  } else if let Some(ref user_path) = user_config
    && user_path.exists()
  {
    println!("Using user config: {:?}", user_path);
  } else {
    println!("Using default configuration (no config file found)");
  }
  println!("Report file: {:?}", config.report_path());
  println!();

  let toml_str = toml::to_string_pretty(&config)?;
  println!("{}", toml_str);

  Ok(())
}

/// Write a config template into a root folder
pub fn cmd_config_init(root: Option<PathBuf>) -> Result<()> {
  let root = root_or_cwd(root)?;
  let config_path = Config::project_config_path(&root);

  if config_path.exists() {
    bail!("Config file already exists: {:?}. Delete it first if you want to regenerate", config_path);
  }

  std::fs::write(&config_path, Config::generate_template())
    .with_context(|| format!("Failed to write {:?}", config_path))?;

  println!("Created config: {:?}", config_path);
  println!("Edit the file to customize settings.");

  Ok(())
}

//! The default command: prompt for a root, rewrite descriptors, report.

use anyhow::{Context, Result};
use relink_core::discovery::validate_root;
use relink_core::{Config, FileOutcome, RunObserver, RunOptions, run};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::error;

use crate::RunArgs;
use crate::logging::init_cli_logging;

/// Prints per-file progress to stdout.
struct ConsoleProgress {
  dry_run: bool,
}

impl RunObserver for ConsoleProgress {
  fn file_started(&mut self, path: &Path) {
    println!("Processing file: {}", path.display());
  }

  fn file_finished(&mut self, _path: &Path, outcome: &FileOutcome) {
    match outcome {
      FileOutcome::Changed if self.dry_run => println!("Changes found (dry run, not saved)."),
      FileOutcome::Changed => println!("Changes saved."),
      FileOutcome::Unchanged => println!("No paths to replace."),
      FileOutcome::Failed { reason } => println!("Skipped: {}", reason),
    }
  }
}

/// Ask for the root folder on stdin.
fn prompt_root<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<PathBuf> {
  writeln!(output, "Enter the root folder path to search for project files:")?;
  output.flush()?;

  let mut line = String::new();
  input.read_line(&mut line).context("Failed to read root folder")?;
  Ok(PathBuf::from(line.trim()))
}

/// Rewrite every descriptor under the root folder
pub fn cmd_run(args: RunArgs) -> Result<()> {
  let root = match args.root {
    Some(root) => root,
    None => prompt_root(&mut std::io::stdin().lock(), &mut std::io::stdout())?,
  };

  let config = if root.is_dir() {
    Config::load_for_root(&root)?
  } else {
    Config::default()
  };
  init_cli_logging(&config.logging.level, args.verbose);

  if let Err(e) = validate_root(&root) {
    error!("{}", e);
    println!("Invalid folder. Please try again.");
    std::process::exit(1);
  }

  let options = RunOptions {
    discovery: config.discovery.clone(),
    dry_run: args.dry_run,
    ..RunOptions::new(args.report.unwrap_or_else(|| config.report_path()))
  };

  let mut progress = ConsoleProgress { dry_run: args.dry_run };
  let summary = run(&root, &options, &mut progress).context("Run failed")?;

  if args.json {
    println!("{}", serde_json::to_string_pretty(&summary)?);
  }
  println!(
    "Process completed. Check the history file at: {}",
    summary.report_path.display()
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_prompt_root_trims_input() {
    let mut input = std::io::Cursor::new(b"  /work/solution \n".to_vec());
    let mut output = Vec::new();
    let root = prompt_root(&mut input, &mut output).unwrap();

    assert_eq!(root, PathBuf::from("/work/solution"));
    assert_eq!(
      String::from_utf8(output).unwrap(),
      "Enter the root folder path to search for project files:\n"
    );
  }

  #[test]
  fn test_prompt_root_empty_input() {
    let mut input = std::io::Cursor::new(Vec::new());
    let mut output = Vec::new();
    let root = prompt_root(&mut input, &mut output).unwrap();
    assert!(validate_root(&root).is_err());
  }
}

//! relink CLI - rewrite absolute project references into relative paths

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;

use commands::{cmd_config_init, cmd_config_show, cmd_run};

#[derive(Parser)]
#[command(name = "relink")]
#[command(about = "Rewrite absolute HintPath and ProjectReference entries in *.*proj files into relative paths")]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = "\
QUICK START:
  relink                          # Prompt for the root folder
  relink path/to/solution         # Rewrite every *.*proj under the folder
  relink --dry-run path/to/sln    # Report what would change, save nothing

CONFIGURATION:
  relink config init [ROOT]       # Write ROOT/.relink.toml
  relink config show [ROOT]       # Print the effective configuration")]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,

  #[command(flatten)]
  run: RunArgs,
}

/// Arguments for the default rewrite run
#[derive(Args, Debug, Default)]
pub struct RunArgs {
  /// Root folder to search for project files (prompted for when omitted)
  pub root: Option<PathBuf>,
  /// Write the change history here instead of next to the executable
  #[arg(long, value_name = "FILE")]
  pub report: Option<PathBuf>,
  /// Transform and report without saving any project file
  #[arg(long)]
  pub dry_run: bool,
  /// Print the run summary as JSON
  #[arg(long)]
  pub json: bool,
  /// Enable debug logging
  #[arg(short, long)]
  pub verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
  /// Manage configuration
  Config {
    #[command(subcommand)]
    command: ConfigCommand,
  },
}

/// Subcommands for `relink config`
#[derive(Subcommand)]
enum ConfigCommand {
  /// Show the effective configuration for a root folder
  Show {
    /// Root folder (default: current directory)
    root: Option<PathBuf>,
  },
  /// Write a config template into a root folder
  Init {
    /// Root folder (default: current directory)
    root: Option<PathBuf>,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  match cli.command {
    Some(Commands::Config { command }) => {
      logging::init_cli_logging("info", false);
      match command {
        ConfigCommand::Show { root } => cmd_config_show(root),
        ConfigCommand::Init { root } => cmd_config_init(root),
      }
    }
    None => cmd_run(cli.run),
  }
}

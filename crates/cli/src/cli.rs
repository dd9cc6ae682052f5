use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{layout_command, plugins_command, typegen_command};
use crate::utils::parse_env_pair;

#[derive(Parser, Debug)]
#[command(name = "appreflect")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the plugins an application registers
    #[command(visible_alias = "p")]
    Plugins {
        #[command(flatten)]
        args: ReflectArgs,

        /// Print the plugin list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate type artifacts from an application's schema
    #[command(visible_alias = "t")]
    Typegen {
        #[command(flatten)]
        args: ReflectArgs,
    },
    /// Print the layout discovered for a project
    Layout {
        /// Project root (defaults to current directory)
        #[arg(long)]
        project_root: Option<PathBuf>,

        /// Override the artifacts directory
        #[arg(long)]
        artifacts_dir: Option<PathBuf>,
    },
}

/// Options shared by every command that starts a reflection process.
#[derive(Args, Debug, Clone, Default)]
pub struct ReflectArgs {
    /// Reflection executable (defaults to `executable` from .appreflect.json)
    pub executable: Option<PathBuf>,

    /// Project root (defaults to current directory)
    #[arg(long)]
    pub project_root: Option<PathBuf>,

    /// Read the layout from a JSON file instead of discovering it
    #[arg(long)]
    pub layout: Option<PathBuf>,

    /// Override the artifacts directory
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,

    /// Seconds to wait for the reflection process
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Extra environment for the reflection process
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Let the reflection process write straight to this terminal's stderr
    #[arg(long)]
    pub no_capture: bool,

    /// Show stack traces for reported errors
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Commands {
    pub fn execute(self) -> Result<()> {
        match self {
            Commands::Plugins { args, json } => plugins_command(&args, json),
            Commands::Typegen { args } => typegen_command(&args),
            Commands::Layout {
                project_root,
                artifacts_dir,
            } => layout_command(project_root.as_deref(), artifacts_dir.as_deref()),
        }
    }
}

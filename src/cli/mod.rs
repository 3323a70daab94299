//! Command-line interface.

pub mod commands;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use self::commands::disable::DisableArgs;
use self::commands::export::ExportArgs;
use self::commands::init::InitArgs;
use self::commands::remove::RemoveArgs;
use self::commands::status::StatusArgs;
use self::commands::sync::SyncArgs;

#[derive(Parser, Debug)]
#[command(
    name = "sksync",
    version,
    about = "Synchronize a canonical skill library across native tool directories"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Emit machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub robot: bool,

    /// Path to config.toml (overrides SKSYNC_CONFIG and the default)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress logging entirely
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync the whole library, or one skill
    Sync(SyncArgs),

    /// Report per-skill, per-location divergence without mutating
    Status(StatusArgs),

    /// Export a skill into one location's active root
    Export(ExportArgs),

    /// Move a skill's replica into a location's disabled root
    Disable(DisableArgs),

    /// Delete every managed replica of a skill at a location
    Remove(RemoveArgs),

    /// List configured locations
    Locations,

    /// Create the library root and a starter config
    Init(InitArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl Cli {
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        if self.robot {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

//! Application context shared by all CLI commands.

use std::path::PathBuf;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::sync::types::Location;

pub struct AppContext {
    pub library_root: PathBuf,
    pub config: Config,
    pub locations: Vec<Location>,
    pub output_format: OutputFormat,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        let library_root = std::env::var("SKSYNC_ROOT")
            .map_or_else(|_| config.library_root(), PathBuf::from);
        let locations = config.resolved_locations();

        Ok(Self {
            library_root,
            config,
            locations,
            output_format: cli.output_format(),
            verbosity: cli.verbose,
        })
    }

    /// Look up a configured location by id.
    pub fn location(&self, id: &str) -> Result<&Location> {
        self.locations
            .iter()
            .find(|loc| loc.id == id)
            .ok_or_else(|| SyncError::UnknownLocation(id.to_string()))
    }
}

//! Command dispatch.

pub mod disable;
pub mod export;
pub mod init;
pub mod locations;
pub mod remove;
pub mod status;
pub mod sync;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

/// Run a command; the returned value is the process exit code.
pub fn run(ctx: &AppContext, command: &Commands) -> Result<u8> {
    match command {
        Commands::Sync(args) => sync::run(ctx, args),
        Commands::Status(args) => status::run(ctx, args),
        Commands::Export(args) => export::run(ctx, args),
        Commands::Disable(args) => disable::run(ctx, args),
        Commands::Remove(args) => remove::run(ctx, args),
        Commands::Locations => locations::run(ctx),
        Commands::Init(args) => init::run(ctx, args),
    }
}

//! sksync init - Create the library root and a starter config.

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::config::DEFAULT_CONFIG_TEMPLATE;
use crate::error::{Result, SyncError};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

pub fn run(ctx: &AppContext, args: &InitArgs) -> Result<u8> {
    std::fs::create_dir_all(&ctx.library_root)?;

    let config_path = dirs::config_dir()
        .ok_or_else(|| SyncError::Config("config directory not found".to_string()))?
        .join("sksync/config.toml");
    let wrote_config = if config_path.exists() && !args.force {
        false
    } else {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;
        true
    };

    if ctx.output_format == OutputFormat::Json {
        let body = serde_json::json!({
            "libraryRoot": ctx.library_root,
            "configPath": config_path,
            "wroteConfig": wrote_config,
        });
        println!("{}", serde_json::to_string(&body).unwrap_or_default());
    } else {
        println!("library root: {}", ctx.library_root.display());
        if wrote_config {
            println!("{} {}", "wrote".green(), config_path.display());
        } else {
            println!("{} {}", "kept".dimmed(), config_path.display());
        }
    }
    Ok(0)
}

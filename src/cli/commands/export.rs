//! sksync export - Export one skill into one location.

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::library;
use crate::sync::engine::SyncEngine;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Skill name in the library
    pub skill: String,

    /// Destination location id
    pub location: String,
}

pub fn run(ctx: &AppContext, args: &ExportArgs) -> Result<u8> {
    let skill = library::find_skill(&ctx.library_root, &args.skill)?;
    let location = ctx.location(&args.location)?;

    let dest = SyncEngine::new().export(&skill.dir, &skill.name, &skill.id, location)?;

    if ctx.output_format == OutputFormat::Json {
        let body = serde_json::json!({
            "skill": skill.name,
            "location": location.id,
            "path": dest,
        });
        println!("{}", serde_json::to_string(&body).unwrap_or_default());
    } else {
        println!(
            "{} {} {} ({})",
            skill.name.bold(),
            "exported to".green(),
            location.id,
            dest.display()
        );
    }
    Ok(0)
}

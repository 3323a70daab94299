//! sksync remove - Delete a skill's replicas at a location.

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::library;
use crate::sync::engine::SyncEngine;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Skill name in the library
    pub skill: String,

    /// Location id to remove the skill from
    pub location: String,
}

pub fn run(ctx: &AppContext, args: &RemoveArgs) -> Result<u8> {
    let skill = library::find_skill(&ctx.library_root, &args.skill)?;
    let location = ctx.location(&args.location)?;

    let removed = SyncEngine::new().remove(&skill.id, location)?;

    if ctx.output_format == OutputFormat::Json {
        let body = serde_json::json!({
            "skill": skill.name,
            "location": location.id,
            "removed": removed,
        });
        println!("{}", serde_json::to_string(&body).unwrap_or_default());
    } else if removed.is_empty() {
        println!("{} {}", skill.name.bold(), "nothing to remove".dimmed());
    } else {
        for path in &removed {
            println!("{} {} {}", skill.name.bold(), "removed".red(), path.display());
        }
    }
    Ok(0)
}

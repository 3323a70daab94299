//! sksync disable - Park a skill's replica in the disabled root.

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::library;
use crate::sync::engine::SyncEngine;

#[derive(Args, Debug)]
pub struct DisableArgs {
    /// Skill name in the library
    pub skill: String,

    /// Location id to disable the skill at
    pub location: String,
}

pub fn run(ctx: &AppContext, args: &DisableArgs) -> Result<u8> {
    let skill = library::find_skill(&ctx.library_root, &args.skill)?;
    let location = ctx.location(&args.location)?;

    let parked = SyncEngine::new().disable(&skill.id, &skill.name, location)?;

    if ctx.output_format == OutputFormat::Json {
        let body = serde_json::json!({
            "skill": skill.name,
            "location": location.id,
            "path": parked,
        });
        println!("{}", serde_json::to_string(&body).unwrap_or_default());
    } else {
        println!(
            "{} {} {} ({})",
            skill.name.bold(),
            "disabled at".yellow(),
            location.id,
            parked.display()
        );
    }
    Ok(0)
}

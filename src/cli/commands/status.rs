//! sksync status - Read-only divergence report.

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::library;
use crate::sync::engine::{SyncEngine, SyncRequest};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Restrict the report to one skill
    pub skill: Option<String>,
}

pub fn run(ctx: &AppContext, args: &StatusArgs) -> Result<u8> {
    let engine = SyncEngine::new();
    let skills = match args.skill.as_deref() {
        Some(name) => vec![library::find_skill(&ctx.library_root, name)?],
        None => library::discover_skills(&ctx.library_root)?,
    };

    let mut rows = Vec::new();
    for skill in &skills {
        let enabled = ctx.config.enabled_location_ids(&skill.name);
        let request = SyncRequest {
            skill_id: &skill.id,
            preferred_name: &skill.name,
            canonical_dir: &skill.dir,
            enabled: &enabled,
            locations: &ctx.locations,
            force_source: None,
        };
        rows.push((skill, engine.inspect_skill(&request)?));
    }

    if ctx.output_format == OutputFormat::Json {
        let body: Vec<serde_json::Value> = rows
            .iter()
            .map(|(skill, status)| {
                serde_json::json!({
                    "skill": skill.name,
                    "skillId": skill.id,
                    "baseline": status.baseline,
                    "replicas": status.replicas,
                    "missing": status.missing,
                })
            })
            .collect();
        println!("{}", serde_json::to_string(&body).unwrap_or_default());
        return Ok(0);
    }

    for (skill, status) in &rows {
        let synced_before = status.baseline.is_some();
        println!(
            "{} {}",
            skill.name.bold(),
            if synced_before {
                String::new()
            } else {
                "(never synced)".dimmed().to_string()
            }
        );
        for replica in &status.replicas {
            let state = if !synced_before {
                "-".dimmed().to_string()
            } else if replica.changed_from_baseline {
                "changed".yellow().to_string()
            } else {
                "in sync".green().to_string()
            };
            println!("    {:<12} {state}", replica.source.to_string());
        }
        for missing in &status.missing {
            println!("    {missing:<12} {}", "missing".dimmed());
        }
    }
    if rows.is_empty() {
        println!("{}", "No skills in the library.".dimmed());
    }
    Ok(0)
}

//! sksync sync - Run the synchronization protocol.
//!
//! Without arguments, sweeps every skill in the library. With a skill
//! name, syncs only that skill; `--force-source` resolves a previously
//! reported conflict in favor of one replica.

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::library;
use crate::sync::engine::SyncEngine;
use crate::sync::types::{SourceRef, SyncOutcome};

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Skill to sync (defaults to the whole library)
    pub skill: Option<String>,

    /// Winning replica for a conflicted skill: a location id, or
    /// "canonical" for the library copy
    #[arg(long, value_name = "SOURCE", requires = "skill")]
    pub force_source: Option<String>,
}

pub fn run(ctx: &AppContext, args: &SyncArgs) -> Result<u8> {
    let engine = SyncEngine::new();
    let force_source = args.force_source.as_deref().map(SourceRef::parse);
    let report = library::sweep(
        &engine,
        &ctx.config,
        &ctx.library_root,
        args.skill.as_deref(),
        force_source,
    )?;

    match ctx.output_format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Human => print_human(&report),
    }
    Ok(report.exit_code())
}

fn print_json(report: &library::SweepReport) {
    let skills: Vec<serde_json::Value> = report
        .results
        .iter()
        .map(|entry| match &entry.result {
            Ok(outcome) => serde_json::json!({
                "skill": entry.skill.name,
                "skillId": entry.skill.id,
                "result": outcome,
            }),
            Err(err) => serde_json::json!({
                "skill": entry.skill.name,
                "skillId": entry.skill.id,
                "error": { "code": err.code(), "message": err.to_string() },
            }),
        })
        .collect();
    let body = serde_json::json!({
        "skills": skills,
        "conflicts": report.conflicts(),
        "failures": report.failures(),
    });
    println!("{}", serde_json::to_string(&body).unwrap_or_default());
}

fn print_human(report: &library::SweepReport) {
    for entry in &report.results {
        let name = entry.skill.name.as_str();
        match &entry.result {
            Ok(SyncOutcome::UpToDate) => {
                println!("{} {}", name.bold(), "up to date".dimmed());
            }
            Ok(SyncOutcome::ExportsCreated { locations }) => {
                println!(
                    "{} {} {}",
                    name.bold(),
                    "exported to".green(),
                    locations.join(", ")
                );
            }
            Ok(SyncOutcome::Propagated { source }) => {
                println!("{} {} {}", name.bold(), "propagated from".green(), source);
            }
            Ok(SyncOutcome::Conflict { replicas }) => {
                println!("{} {}", name.bold(), "CONFLICT".red().bold());
                for replica in replicas {
                    let marker = if replica.changed_from_baseline {
                        "changed".yellow().to_string()
                    } else {
                        "unchanged".dimmed().to_string()
                    };
                    println!(
                        "    {:<12} {} {} {}",
                        replica.source.to_string(),
                        marker,
                        short_hash(&replica.hash).dimmed(),
                        replica.path.display()
                    );
                }
                println!(
                    "    resolve with: sksync sync {name} --force-source <location|canonical>"
                );
            }
            Err(err) => {
                println!("{} {} {err}", name.bold(), "error:".red());
            }
        }
    }
    if report.results.is_empty() {
        println!("{}", "No skills in the library.".dimmed());
    }
}

fn short_hash(hash: &str) -> &str {
    let end = hash.len().min("sha256:".len() + 12);
    &hash[..end]
}

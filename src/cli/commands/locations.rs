//! sksync locations - List configured locations.

use colored::Colorize;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::error::Result;

pub fn run(ctx: &AppContext) -> Result<u8> {
    if ctx.output_format == OutputFormat::Json {
        let body: Vec<serde_json::Value> = ctx
            .locations
            .iter()
            .map(|loc| {
                serde_json::json!({
                    "id": loc.id,
                    "name": loc.name,
                    "activeRoot": loc.active_root,
                    "disabledRoot": loc.disabled_root,
                })
            })
            .collect();
        println!("{}", serde_json::to_string(&body).unwrap_or_default());
        return Ok(0);
    }

    for loc in &ctx.locations {
        println!("{} ({})", loc.id.bold(), loc.name);
        println!("    active:   {}", loc.active_root.display());
        println!("    disabled: {}", loc.disabled_root.display());
    }
    Ok(0)
}

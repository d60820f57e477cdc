//! `orals config` commands

use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::commands::dispatch::CommandContext;
use orals_core::bail_usage;
use orals_core::config::GraderConfig;
use orals_core::error::{OralsError, Result};

fn config_path(ctx: &CommandContext) -> Result<PathBuf> {
    match &ctx.cli.config {
        Some(path) => Ok(path.clone()),
        None => GraderConfig::default_path(),
    }
}

/// Effective config, with the API key masked
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let mut config = ctx.config.clone();
    if config.llm.api_key.is_some() {
        config.llm.api_key = Some("********".to_string());
    }
    match ctx.cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Human | OutputFormat::Records => {
            let text = toml::to_string_pretty(&config)
                .map_err(|e| OralsError::Other(format!("failed to serialize config: {}", e)))?;
            print!("{}", text);
        }
    }
    Ok(())
}

pub fn execute_init(ctx: &CommandContext, force: bool) -> Result<()> {
    let path = config_path(ctx)?;
    if path.exists() && !force {
        bail_usage!(format!(
            "config file already exists: {} (use --force to overwrite)",
            path.display()
        ));
    }
    GraderConfig::default().save(&path)?;

    match ctx.cli.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "path": path.display().to_string(),
                "created": true,
            }))?
        ),
        OutputFormat::Human | OutputFormat::Records => {
            if !ctx.cli.quiet {
                println!("Wrote {}", path.display());
            }
        }
    }
    Ok(())
}

pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = config_path(ctx)?;
    match ctx.cli.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "path": path.display().to_string(),
                "exists": path.exists(),
            }))?
        ),
        OutputFormat::Human | OutputFormat::Records => println!("{}", path.display()),
    }
    Ok(())
}

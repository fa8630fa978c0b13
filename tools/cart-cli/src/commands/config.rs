//! Configuration commands.

use std::path::Path;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config;
use crate::context::Context;

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show(ctx),
        ConfigCommand::Init { path, force } => init(Path::new(&path), force, ctx),
        ConfigCommand::Validate => validate(ctx),
    }
}

fn show(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Storage");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(built-in default)"),
    }
    for (i, storage) in ctx.config.storage.iter().enumerate() {
        ctx.output.kv(
            &format!("[{}]", i),
            &format!(
                "{:?} when {:?}, store {}",
                storage.backend,
                storage.condition,
                storage.store.as_deref().unwrap_or("(default)")
            ),
        );
    }
    Ok(())
}

fn init(path: &Path, force: bool, ctx: &Context) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    config::save(&config::cli_default(), path)?;
    ctx.output.success(&format!("Wrote {}", path.display()));
    Ok(())
}

fn validate(ctx: &Context) -> Result<()> {
    ctx.config.validate()?;
    ctx.output.success("Configuration is valid");
    ctx.output.json(&serde_json::json!({ "valid": true }));
    Ok(())
}

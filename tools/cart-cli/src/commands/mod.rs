//! CLI command implementations.

pub mod config;
pub mod items;
pub mod query;

use clap::{Args, Subcommand};

/// Parse a `name=value` pair.
pub fn parse_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

/// Parse a `name=integer` pair.
pub fn parse_attribute(s: &str) -> Result<(String, i64), String> {
    let (name, value) = parse_pair(s)?;
    let value = value
        .parse::<i64>()
        .map_err(|_| format!("attribute '{}' must be an integer, got '{}'", name, value))?;
    Ok((name, value))
}

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Product identifier.
    pub product: String,

    /// Quantity to set for the line.
    #[arg(short, long, default_value = "1")]
    pub qty: i64,

    /// Item kind (slash-separated).
    #[arg(short, long, default_value = "product")]
    pub kind: String,

    /// Chosen option, part of the line identity (repeatable).
    #[arg(short, long = "option", value_parser = parse_pair)]
    pub options: Vec<(String, String)>,

    /// Numeric attribute such as price in cents (repeatable).
    #[arg(short, long = "attr", value_parser = parse_attribute)]
    pub attributes: Vec<(String, i64)>,

    /// Don't save the change.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the remove command.
#[derive(Args)]
pub struct RemoveArgs {
    /// Unique id of the line, as shown by `cart list`.
    pub unique_id: String,

    /// Units to take out; 0 removes the whole line.
    #[arg(short, long, default_value = "0")]
    pub qty: i64,

    /// Don't save the change.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the clear command.
#[derive(Args)]
pub struct ClearArgs {
    /// Don't save the change.
    #[arg(long)]
    pub dry_run: bool,
}

/// Kind filter shared by the query commands.
#[derive(Args)]
pub struct KindFilter {
    /// Only items of this kind or a sub-kind.
    #[arg(short, long)]
    pub kind: Option<String>,
}

/// Arguments for the total command.
#[derive(Args)]
pub struct TotalArgs {
    /// Attribute to sum (`quantity` sums units).
    pub attribute: String,

    #[command(flatten)]
    pub filter: KindFilter,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the active storage configuration.
    Show,
    /// Write a starter config file.
    Init {
        /// Path to write.
        #[arg(default_value = "cart.toml")]
        path: String,

        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}

//! Cart CLI - inspect and edit carts from the command line.
//!
//! Commands:
//! - `cart add` - Put a product in the cart
//! - `cart remove` - Take units or a whole line out
//! - `cart clear` - Empty the cart
//! - `cart list` / `cart count` / `cart total` - Query the cart
//! - `cart new-session` - Print a fresh session id
//! - `cart config` - Manage storage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use cart_core::CartContext;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{AddArgs, ClearArgs, ConfigArgs, KindFilter, RemoveArgs, TotalArgs};

/// Cart CLI - inspect and edit carts stored by the configured backends
#[derive(Parser)]
#[command(name = "cart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Session that owns the cart
    #[arg(short, long, global = true, default_value = "cli")]
    session: String,

    /// Logged-in user, if any
    #[arg(short, long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Put a product in the cart, replacing the line's quantity
    Add(AddArgs),

    /// Take units of a line out of the cart
    Remove(RemoveArgs),

    /// Remove every line
    Clear(ClearArgs),

    /// List the lines in the cart
    List(KindFilter),

    /// Count distinct lines
    Count(KindFilter),

    /// Sum a numeric attribute
    Total(TotalArgs),

    /// Print a new random session id
    NewSession,

    /// Manage configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = output::Output::new(cli.verbose, cli.json);

    if let Commands::NewSession = cli.command {
        let id = cart_core::SessionId::generate();
        output.json(&serde_json::json!({ "session": id }));
        if !output.is_json() {
            println!("{}", id);
        }
        return Ok(());
    }

    let owner = match cli.user {
        Some(user) => CartContext::user(cli.session, user),
        None => CartContext::guest(cli.session),
    };
    let ctx = context::Context::load(cli.config.as_deref(), owner, output)?;

    let result = match cli.command {
        Commands::Add(args) => commands::items::add(args, &ctx),
        Commands::Remove(args) => commands::items::remove(args, &ctx),
        Commands::Clear(args) => commands::items::clear(args, &ctx),
        Commands::List(filter) => commands::query::list(filter, &ctx),
        Commands::Count(filter) => commands::query::count(filter, &ctx),
        Commands::Total(args) => commands::query::total(args, &ctx),
        Commands::Config(args) => commands::config::run(args, &ctx),
        Commands::NewSession => Ok(()),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

//! CLI execution context.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use cart_core::{Cart, CartConfig, CartContext};

use crate::config;
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// Storage configuration.
    pub config: CartConfig,
    /// Where the configuration came from, if a file.
    pub config_path: Option<PathBuf>,
    /// Owner of the cart being worked on.
    pub owner: CartContext,
    /// Output handler.
    pub output: Output,
}

impl Context {
    /// Load the configuration and build the cart owner.
    pub fn load(
        config_path: Option<&str>,
        owner: CartContext,
        output: Output,
    ) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config_path = match config_path {
            Some(path) => Some(PathBuf::from(path)),
            None => config::find(&cwd),
        };
        let config = match &config_path {
            Some(path) => config::load(path)?,
            None => config::cli_default(),
        };

        Ok(Self {
            config,
            config_path,
            owner,
            output,
        })
    }

    /// Initialize the cart for the configured owner.
    pub fn open_cart(&self) -> Result<Cart> {
        let cart = Cart::initialize(self.owner.clone(), self.config.registrations())
            .with_context(|| format!("Failed to open cart for session {}", self.owner.session_id))?;
        self.output.debug(&format!("active storage: {}", cart.backend_names().join(", ")));
        Ok(cart)
    }
}

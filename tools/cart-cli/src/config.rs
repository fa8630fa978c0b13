//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cart_core::config::{BackendKind, CartConfig, StorageConfig};

/// File names searched for, in order, from the working directory upwards.
pub const CONFIG_NAMES: [&str; 3] = ["cart.toml", ".cart.toml", "cart.json"];

/// Load config from a file. `.json` files are JSON, everything else TOML.
pub fn load(path: &Path) -> Result<CartConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: CartConfig = if path.extension().is_some_and(|e| e == "json") {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?
    };

    config
        .validate()
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    Ok(config)
}

/// Save config to a file.
pub fn save(config: &CartConfig, path: &Path) -> Result<()> {
    let content = if path.extension().is_some_and(|e| e == "json") {
        serde_json::to_string_pretty(config)?
    } else {
        toml::to_string_pretty(config)?
    };

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))
}

/// Find a config file in `start` or its parents.
pub fn find(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}

/// Config used when no file is found: a local SQLite file, since the
/// in-process session store does not outlive a single command.
pub fn cli_default() -> CartConfig {
    CartConfig {
        storage: vec![StorageConfig::new(BackendKind::Database).with_store("cart.db")],
    }
}

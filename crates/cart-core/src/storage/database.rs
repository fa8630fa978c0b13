//! Database-backed cart storage.

use crate::cart::{Cart, CartItem};
use crate::context::CartContext;
use crate::error::CartError;
use crate::storage::StorageBackend;
use cart_db::{params, Db};
use serde::Deserialize;

/// Table used when none is given.
pub const DEFAULT_TABLE: &str = "cart";

#[derive(Deserialize)]
struct CartRow {
    data: String,
}

/// Stores one row per cart owner.
///
/// Authenticated carts are keyed by user id so they follow the user across
/// sessions; guest carts are keyed by session id.
pub struct DatabaseStorage {
    db: Db,
    table: String,
}

impl DatabaseStorage {
    /// Backend name.
    pub const NAME: &'static str = "database";

    /// Use `db` with the default table, creating it if missing.
    pub fn new(db: Db) -> Result<Self, CartError> {
        Self::with_table(db, DEFAULT_TABLE)
    }

    /// Use `db` with a custom table name, creating the table if missing.
    pub fn with_table(db: Db, table: &str) -> Result<Self, CartError> {
        let valid = !table.is_empty()
            && table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(CartError::ConfigError(format!("invalid table name '{}'", table)));
        }

        db.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (\
                 owner_key TEXT PRIMARY KEY, \
                 data TEXT NOT NULL, \
                 updated_at INTEGER NOT NULL)",
                table
            ),
            params![],
        )?;

        Ok(Self {
            db,
            table: table.to_string(),
        })
    }

    /// Open a database by name (a file path on native builds).
    pub fn open(name: &str) -> Result<Self, CartError> {
        Self::new(Db::open(name)?)
    }

    /// Open the default database.
    pub fn open_default() -> Result<Self, CartError> {
        Self::new(Db::open_default()?)
    }

    /// Row key for a cart owner.
    pub fn owner_key(context: &CartContext) -> String {
        match &context.user_id {
            Some(user) => format!("user:{}", user),
            None => format!("session:{}", context.session_id),
        }
    }
}

impl StorageBackend for DatabaseStorage {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn load(&self, cart: &Cart) -> Result<Option<Vec<CartItem>>, CartError> {
        let row: Option<CartRow> = self.db.query_optional(
            &format!("SELECT data FROM {} WHERE owner_key = ?", self.table),
            params![Self::owner_key(cart.context())],
        )?;

        match row {
            Some(row) => {
                let items: Vec<CartItem> = serde_json::from_str(&row.data)?;
                Ok(Some(items).filter(|items| !items.is_empty()))
            }
            None => Ok(None),
        }
    }

    fn save(&self, cart: &Cart) -> Result<(), CartError> {
        let data = serde_json::to_string(&cart.snapshot())?;
        self.db.execute(
            &format!(
                "INSERT INTO {} (owner_key, data, updated_at) VALUES (?, ?, ?) \
                 ON CONFLICT(owner_key) DO UPDATE \
                 SET data = excluded.data, updated_at = excluded.updated_at",
                self.table
            ),
            params![Self::owner_key(cart.context()), data, current_timestamp()],
        )?;
        Ok(())
    }
}

fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

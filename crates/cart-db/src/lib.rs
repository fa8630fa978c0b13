//! Type-safe SQLite layer backing cart persistence.
//!
//! Runs on Spin's SQLite under `wasm32` and on `rusqlite` for native builds,
//! with the same query API on both.
//!
//! # Example
//!
//! ```rust,ignore
//! use cart_db::{Db, params};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct CartRow {
//!     owner_key: String,
//!     data: String,
//! }
//!
//! let db = Db::open_default()?;
//! db.execute(
//!     "INSERT INTO cart (owner_key, data) VALUES (?, ?)",
//!     params!["session:abc", "[]"]
//! )?;
//!
//! let row: Option<CartRow> = db.query_optional(
//!     "SELECT owner_key, data FROM cart WHERE owner_key = ?",
//!     params!["session:abc"]
//! )?;
//! ```

mod db;
mod error;
mod types;

pub use db::Db;
pub use error::DbError;
pub use types::{QueryResult, Row, Value};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{params, Db, DbError, QueryResult, Row, Value};
}

/// Create a parameter list for SQL queries.
///
/// # Example
///
/// ```rust,ignore
/// use cart_db::params;
///
/// let params = params!["session:abc", 42];
/// ```
#[macro_export]
macro_rules! params {
    () => {
        &[]
    };
    ($($param:expr),+ $(,)?) => {
        &[$($crate::Value::from($param)),+]
    };
}

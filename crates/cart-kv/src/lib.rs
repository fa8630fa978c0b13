//! Key-value store and session records backing cart persistence.
//!
//! Values are JSON encoded. On `wasm32` the store is Spin's Key-Value Store;
//! native builds use named in-process stores.
//!
//! # Example
//!
//! ```rust,ignore
//! use cart_kv::{Cache, Session, SessionId};
//!
//! let cache = Cache::open_default()?;
//! cache.set("cart:sess_123", &items)?;
//! let items: Option<Vec<CartItem>> = cache.get("cart:sess_123")?;
//!
//! let session = Session::<CartSession>::with_cache(cache);
//! session.set(&SessionId::from("sess_123"), CartSession { items })?;
//! ```

mod error;
mod kv;
mod session;

pub use error::CacheError;
pub use kv::{Cache, DEFAULT_STORE};
pub use session::{Session, SessionData, SessionId};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, Session, SessionId};
}

//! Shopping cart with pluggable storage backends.
//!
//! - **Cart**: line items keyed by a unique id derived from the item, with
//!   add, remove, clear, count and attribute totals
//! - **Storage**: the load/save boundary, with session and database backends
//!   behind the `storage` feature
//! - **Config**: declarative backend lists with activation conditions
//!
//! # Example
//!
//! ```rust,ignore
//! use cart_core::prelude::*;
//!
//! let registrations = vec![
//!     StorageRegistration::new(SessionStorage::open("default")?)
//!         .when(|cart| cart.context().is_guest()),
//!     StorageRegistration::new(DatabaseStorage::open("cart.db")?),
//! ];
//! let mut cart = Cart::initialize(CartContext::guest("sess_123"), registrations)?;
//!
//! let book = CartItem::new(ItemKind::product(), "rust-book").with_attribute("price", 4999);
//! cart.add(book, 2, true)?;
//!
//! let total = cart.attribute_total("price", Some(&ItemKind::product()))?;
//! ```

pub mod cart;
pub mod config;
pub mod context;
pub mod error;
pub mod ids;
pub mod storage;

pub use cart::{Cart, CartItem, ItemKind};
pub use config::CartConfig;
pub use context::CartContext;
pub use error::CartError;
pub use ids::*;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{Cart, CartItem, ItemKind};
    pub use crate::config::{BackendKind, CartConfig, Condition, StorageConfig};
    pub use crate::context::CartContext;
    pub use crate::error::CartError;
    pub use crate::ids::*;
    pub use crate::storage::{StorageBackend, StorageRegistration};

    #[cfg(feature = "storage")]
    pub use crate::storage::{DatabaseStorage, SessionStorage};
}

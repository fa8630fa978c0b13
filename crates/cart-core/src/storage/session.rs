//! Session-backed cart storage.

use crate::cart::{Cart, CartItem};
use crate::error::CartError;
use crate::storage::StorageBackend;
use cart_kv::{Cache, Session};
use serde::{Deserialize, Serialize};

/// Cart data kept in the session record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSession {
    /// Saved line items.
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// Stores the cart in the owner's session, keyed by session id.
pub struct SessionStorage {
    session: Session<CartSession>,
}

impl SessionStorage {
    /// Backend name.
    pub const NAME: &'static str = "session";

    /// Use an already opened store.
    pub fn new(cache: Cache) -> Self {
        Self {
            session: Session::with_cache(cache),
        }
    }

    /// Open a named key-value store.
    pub fn open(store: &str) -> Result<Self, CartError> {
        Ok(Self::new(Cache::open(store)?))
    }
}

impl StorageBackend for SessionStorage {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn load(&self, cart: &Cart) -> Result<Option<Vec<CartItem>>, CartError> {
        let saved = self.session.get(&cart.context().session_id)?;
        Ok(saved.map(|s| s.items).filter(|items| !items.is_empty()))
    }

    fn save(&self, cart: &Cart) -> Result<(), CartError> {
        let data = CartSession {
            items: cart.snapshot(),
        };
        self.session.set(&cart.context().session_id, data)?;
        Ok(())
    }
}

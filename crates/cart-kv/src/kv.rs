//! Key-value store wrapper with automatic serialization.

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};

#[cfg(not(target_arch = "wasm32"))]
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::sync::{Arc, Mutex, OnceLock};

/// Name of the store opened by [`Cache::open_default`].
pub const DEFAULT_STORE: &str = "default";

#[cfg(not(target_arch = "wasm32"))]
type Entries = Arc<Mutex<HashMap<String, Vec<u8>>>>;

/// Type-safe key-value store.
///
/// On `wasm32` this is Spin's Key-Value Store. Elsewhere each named store is
/// an in-process map shared by every handle opened with the same name, so two
/// handles to `"default"` see each other's writes for the life of the process.
///
/// Values are stored as JSON.
#[derive(Clone)]
pub struct Cache {
    #[cfg(target_arch = "wasm32")]
    store: std::rc::Rc<spin_sdk::key_value::Store>,
    #[cfg(not(target_arch = "wasm32"))]
    store: Entries,
}

impl Cache {
    /// Open the default store.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::open_default()?;
    /// ```
    pub fn open_default() -> Result<Self, CacheError> {
        Self::open(DEFAULT_STORE)
    }

    /// Open a named store.
    #[cfg(target_arch = "wasm32")]
    pub fn open(name: &str) -> Result<Self, CacheError> {
        let store = spin_sdk::key_value::Store::open(name)
            .map_err(|e| CacheError::OpenError(e.to_string()))?;
        Ok(Self {
            store: std::rc::Rc::new(store),
        })
    }

    /// Open a named store.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open(name: &str) -> Result<Self, CacheError> {
        static STORES: OnceLock<Mutex<HashMap<String, Entries>>> = OnceLock::new();

        let mut stores = STORES
            .get_or_init(|| Mutex::new(HashMap::new()))
            .lock()
            .map_err(|_| CacheError::OpenError(format!("store registry poisoned ({})", name)))?;
        let store = stores.entry(name.to_string()).or_default().clone();
        Ok(Self { store })
    }

    /// Create a private store not reachable through [`Cache::open`].
    #[cfg(not(target_arch = "wasm32"))]
    pub fn in_memory() -> Self {
        Self {
            store: Entries::default(),
        }
    }

    /// Get a value from the store.
    ///
    /// Returns `None` if the key doesn't exist.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let items: Option<Vec<CartItem>> = cache.get("cart:sess_123")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_raw(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the store, replacing any previous value.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.set_raw(key, bytes)
    }

    #[cfg(target_arch = "wasm32")]
    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.store
            .get(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    #[cfg(target_arch = "wasm32")]
    fn set_raw(&self, key: &str, bytes: Vec<u8>) -> Result<(), CacheError> {
        self.store
            .set(key, &bytes)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    /// Delete a value from the store. Deleting a missing key is not an error.
    #[cfg(target_arch = "wasm32")]
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store
            .delete(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    /// Check if a key exists in the store.
    #[cfg(target_arch = "wasm32")]
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.store
            .exists(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    /// Get all keys in the store.
    #[cfg(target_arch = "wasm32")]
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.store
            .get_keys()
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>, CacheError> {
        self.store
            .lock()
            .map_err(|_| CacheError::StoreError("store lock poisoned".to_string()))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries()?.get(key).cloned())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn set_raw(&self, key: &str, bytes: Vec<u8>) -> Result<(), CacheError> {
        self.entries()?.insert(key.to_string(), bytes);
        Ok(())
    }

    /// Delete a value from the store. Deleting a missing key is not an error.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries()?.remove(key);
        Ok(())
    }

    /// Check if a key exists in the store.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries()?.contains_key(key))
    }

    /// Get all keys in the store, sorted.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys: Vec<String> = self.entries()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// Helper to build store keys with namespacing.
///
/// # Example
///
/// ```rust,ignore
/// let key = cache_key!("cart", session_id);
/// // Returns "cart:sess_abc"
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

//! Declarative storage configuration.
//!
//! ```toml
//! [[storage]]
//! backend = "session"
//! condition = "guest"
//!
//! [[storage]]
//! backend = "database"
//! condition = "authenticated"
//! store = "cart.db"
//! ```

use crate::context::CartContext;
use crate::error::CartError;
use serde::{Deserialize, Serialize};

/// Storage configuration for carts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Backends in load/save order.
    #[serde(default)]
    pub storage: Vec<StorageConfig>,
}

impl Default for CartConfig {
    /// Session storage followed by database storage, both always active.
    fn default() -> Self {
        Self {
            storage: vec![
                StorageConfig::new(BackendKind::Session),
                StorageConfig::new(BackendKind::Database),
            ],
        }
    }
}

/// One configured backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which backend to use.
    pub backend: BackendKind,
    /// When the backend takes part.
    #[serde(default)]
    pub condition: Condition,
    /// Named KV store or database path. Uses the default store when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
}

impl StorageConfig {
    /// An always-active backend on its default store.
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            condition: Condition::Always,
            store: None,
        }
    }

    /// Set the activation condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    /// Set the store name.
    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }
}

/// Available storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Key-value session record.
    Session,
    /// SQLite table.
    Database,
}

/// Activation condition for a configured backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Every cart.
    #[default]
    Always,
    /// Only for carts without a logged-in user.
    Guest,
    /// Only for carts with a logged-in user.
    Authenticated,
}

impl Condition {
    /// Evaluate against a cart owner.
    pub fn holds(&self, context: &CartContext) -> bool {
        match self {
            Condition::Always => true,
            Condition::Guest => context.is_guest(),
            Condition::Authenticated => !context.is_guest(),
        }
    }
}

impl CartConfig {
    /// Check for values that would fail at cart initialization.
    pub fn validate(&self) -> Result<(), CartError> {
        for (i, storage) in self.storage.iter().enumerate() {
            if storage.store.as_deref().is_some_and(|s| s.trim().is_empty()) {
                return Err(CartError::ConfigError(format!(
                    "storage[{}]: store name is empty",
                    i
                )));
            }
        }
        Ok(())
    }

    /// Build storage registrations in configured order.
    ///
    /// Backends are opened lazily, only for carts whose condition holds.
    #[cfg(feature = "storage")]
    pub fn registrations(&self) -> Vec<crate::storage::StorageRegistration> {
        use crate::storage::{DatabaseStorage, SessionStorage, StorageBackend, StorageRegistration};

        self.storage
            .iter()
            .map(|config| {
                let store = config.store.clone();
                let condition = config.condition;
                let registration = match config.backend {
                    BackendKind::Session => StorageRegistration::lazy(move |_| {
                        let backend = match store {
                            Some(name) => SessionStorage::open(&name)?,
                            None => SessionStorage::open(cart_kv::DEFAULT_STORE)?,
                        };
                        Ok(Box::new(backend) as Box<dyn StorageBackend>)
                    }),
                    BackendKind::Database => StorageRegistration::lazy(move |_| {
                        let backend = match store {
                            Some(path) => DatabaseStorage::open(&path)?,
                            None => DatabaseStorage::open_default()?,
                        };
                        Ok(Box::new(backend) as Box<dyn StorageBackend>)
                    }),
                };
                registration.when(move |cart| condition.holds(cart.context()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_holds() {
        let guest = CartContext::guest("s1");
        let user = CartContext::user("s1", "u1");

        assert!(Condition::Always.holds(&guest));
        assert!(Condition::Guest.holds(&guest));
        assert!(!Condition::Guest.holds(&user));
        assert!(Condition::Authenticated.holds(&user));
        assert!(!Condition::Authenticated.holds(&guest));
    }

    #[test]
    fn test_default_config() {
        let config = CartConfig::default();
        let backends: Vec<BackendKind> = config.storage.iter().map(|s| s.backend).collect();
        assert_eq!(backends, vec![BackendKind::Session, BackendKind::Database]);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: CartConfig = serde_json::from_value(serde_json::json!({
            "storage": [
                { "backend": "session" },
                { "backend": "database", "condition": "authenticated", "store": "cart.db" }
            ]
        }))
        .unwrap();

        assert_eq!(config.storage[0].condition, Condition::Always);
        assert_eq!(
            config.storage[1],
            StorageConfig::new(BackendKind::Database)
                .with_condition(Condition::Authenticated)
                .with_store("cart.db")
        );
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result = serde_json::from_value::<CartConfig>(serde_json::json!({
            "storage": [{ "backend": "redis" }]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_empty_store() {
        let config = CartConfig {
            storage: vec![StorageConfig::new(BackendKind::Session).with_store("  ")],
        };
        assert!(matches!(config.validate(), Err(CartError::ConfigError(_))));
    }

    #[cfg(feature = "storage")]
    #[test]
    fn test_registrations_respect_conditions() {
        use crate::cart::Cart;

        let config = CartConfig {
            storage: vec![
                StorageConfig::new(BackendKind::Session)
                    .with_condition(Condition::Guest)
                    .with_store("config-test-guest"),
                StorageConfig::new(BackendKind::Database).with_condition(Condition::Authenticated),
            ],
        };

        let guest = Cart::initialize(CartContext::guest("s1"), config.registrations()).unwrap();
        assert_eq!(guest.backend_names(), vec!["session"]);

        let user = Cart::initialize(CartContext::user("s1", "u1"), config.registrations()).unwrap();
        assert_eq!(user.backend_names(), vec!["database"]);
    }
}

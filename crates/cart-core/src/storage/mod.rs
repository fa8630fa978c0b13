//! Persistence boundary for carts.
//!
//! A [`StorageBackend`] loads a previously saved item list for the cart's
//! owner and saves the current one. Backends are registered through
//! [`StorageRegistration`]s, each optionally guarded by an activation
//! condition that is evaluated once when the cart is initialized.

#[cfg(feature = "storage")]
mod database;
#[cfg(feature = "storage")]
mod session;

#[cfg(feature = "storage")]
pub use database::{DatabaseStorage, DEFAULT_TABLE};
#[cfg(feature = "storage")]
pub use session::{CartSession, SessionStorage};

use crate::cart::{Cart, CartItem};
use crate::context::CartContext;
use crate::error::CartError;

/// A persistence collaborator for carts.
///
/// Implementations must not mutate the cart during `load`, and `save` must
/// write the full item set so that repeated saves of the same state leave the
/// same stored state.
pub trait StorageBackend {
    /// Backend type identity. A cart holds at most one backend per name.
    fn name(&self) -> &'static str;

    /// Read the saved items for this cart's owner.
    ///
    /// `Ok(None)` means nothing has been saved yet.
    fn load(&self, cart: &Cart) -> Result<Option<Vec<CartItem>>, CartError>;

    /// Write the cart's current items.
    fn save(&self, cart: &Cart) -> Result<(), CartError>;
}

type BackendFactory = Box<dyn FnOnce(&CartContext) -> Result<Box<dyn StorageBackend>, CartError>>;
type Condition = Box<dyn Fn(&Cart) -> bool>;

/// A backend factory paired with an optional activation condition.
///
/// # Example
///
/// ```rust,ignore
/// let registrations = vec![
///     StorageRegistration::new(SessionStorage::open("default")?)
///         .when(|cart| cart.context().is_guest()),
///     StorageRegistration::lazy(|_| Ok(Box::new(DatabaseStorage::open("cart.db")?)))
///         .when(|cart| !cart.context().is_guest()),
/// ];
/// let cart = Cart::initialize(context, registrations)?;
/// ```
pub struct StorageRegistration {
    factory: BackendFactory,
    condition: Option<Condition>,
}

impl StorageRegistration {
    /// Register an already constructed backend.
    pub fn new<B>(backend: B) -> Self
    where
        B: StorageBackend + 'static,
    {
        Self::lazy(move |_| Ok(Box::new(backend)))
    }

    /// Register a backend constructed only if its condition passes.
    pub fn lazy<F>(factory: F) -> Self
    where
        F: FnOnce(&CartContext) -> Result<Box<dyn StorageBackend>, CartError> + 'static,
    {
        Self {
            factory: Box::new(factory),
            condition: None,
        }
    }

    /// Only activate the backend when `condition` holds for the cart.
    pub fn when<P>(mut self, condition: P) -> Self
    where
        P: Fn(&Cart) -> bool + 'static,
    {
        self.condition = Some(Box::new(condition));
        self
    }

    pub(crate) fn is_active(&self, cart: &Cart) -> bool {
        self.condition.as_ref().map_or(true, |condition| condition(cart))
    }

    pub(crate) fn instantiate(
        self,
        context: &CartContext,
    ) -> Result<Box<dyn StorageBackend>, CartError> {
        (self.factory)(context)
    }
}

impl std::fmt::Debug for StorageRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageRegistration")
            .field("conditional", &self.condition.is_some())
            .finish()
    }
}

//! The cart aggregate.

use crate::cart::{CartItem, ItemKind};
use crate::context::CartContext;
use crate::error::CartError;
use crate::storage::{StorageBackend, StorageRegistration};
use tracing::{debug, info, warn};

/// A shopping cart.
///
/// Holds line items keyed by [`CartItem::unique_id`] in insertion order and
/// the storage backends that were active when it was initialized. Every
/// stored line has a positive quantity.
pub struct Cart {
    context: CartContext,
    items: Vec<CartItem>,
    storage: Vec<Box<dyn StorageBackend>>,
}

impl Cart {
    /// Build a cart for `context` and load its saved items.
    ///
    /// Registrations are evaluated in order; each condition runs exactly once
    /// and only passing backends are instantiated. A backend whose name is
    /// already active replaces the earlier one in place. Active backends are
    /// then asked to `load` in order and the first non-empty result becomes
    /// the cart's items. No saved data yields an empty cart.
    pub fn initialize(
        context: CartContext,
        registrations: impl IntoIterator<Item = StorageRegistration>,
    ) -> Result<Self, CartError> {
        let mut cart = Self {
            context,
            items: Vec::new(),
            storage: Vec::new(),
        };

        for registration in registrations {
            if !registration.is_active(&cart) {
                info!(session = %cart.context.session_id, "storage backend skipped by condition");
                continue;
            }
            let backend = registration.instantiate(&cart.context)?;
            info!(
                backend = backend.name(),
                session = %cart.context.session_id,
                "storage backend activated"
            );
            cart.set_storage(backend);
        }

        let mut loaded = None;
        for backend in &cart.storage {
            match backend.load(&cart)? {
                Some(items) if !items.is_empty() => {
                    debug!(backend = backend.name(), count = items.len(), "cart loaded");
                    loaded = Some(items);
                    break;
                }
                _ => debug!(backend = backend.name(), "no saved cart"),
            }
        }
        if let Some(items) = loaded {
            cart.install(items);
        }

        Ok(cart)
    }

    /// A cart with no storage backends.
    pub fn in_memory(context: CartContext) -> Self {
        Self {
            context,
            items: Vec::new(),
            storage: Vec::new(),
        }
    }

    fn set_storage(&mut self, backend: Box<dyn StorageBackend>) {
        let name = backend.name();
        match self.storage.iter_mut().find(|b| b.name() == name) {
            Some(existing) => *existing = backend,
            None => self.storage.push(backend),
        }
    }

    /// Adopt loaded items, dropping lines that break the positive-quantity
    /// invariant. Duplicate ids keep the last occurrence.
    fn install(&mut self, items: Vec<CartItem>) {
        for item in items {
            if item.quantity <= 0 {
                warn!(
                    item = %item.unique_id(),
                    quantity = item.quantity,
                    "dropping loaded line without quantity"
                );
                continue;
            }
            self.upsert(item);
        }
    }

    fn upsert(&mut self, item: CartItem) {
        let unique_id = item.unique_id();
        match self.items.iter_mut().find(|i| i.unique_id() == unique_id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    fn position(&self, unique_id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.unique_id() == unique_id)
    }

    /// Put an item in the cart with the given quantity.
    ///
    /// The quantity replaces any quantity already stored for the same line;
    /// it is not added to it. Saves to every active backend when `persist`.
    pub fn add(
        &mut self,
        mut item: CartItem,
        quantity: i64,
        persist: bool,
    ) -> Result<&mut Self, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        item.quantity = quantity;
        debug!(item = %item.unique_id(), quantity, "add to cart");
        self.upsert(item);

        if persist {
            self.save()?;
        }
        Ok(self)
    }

    /// Take `quantity` units of a line out of the cart.
    ///
    /// A quantity of zero, or one that leaves nothing, removes the whole line.
    pub fn remove(
        &mut self,
        unique_id: &str,
        quantity: i64,
        persist: bool,
    ) -> Result<&mut Self, CartError> {
        if quantity < 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        let index = self
            .position(unique_id)
            .ok_or_else(|| CartError::ItemNotFound(unique_id.to_string()))?;

        let remaining = self
            .items
            .get(index)
            .map_or(0, |item| item.quantity.saturating_sub(quantity));
        if quantity == 0 || remaining <= 0 {
            let removed = self.items.remove(index);
            debug!(item = %removed.unique_id(), "line removed");
        } else if let Some(item) = self.items.get_mut(index) {
            item.quantity = remaining;
            debug!(item = unique_id, remaining, "line quantity reduced");
        }

        if persist {
            self.save()?;
        }
        Ok(self)
    }

    /// Delete all items.
    pub fn clear(&mut self, persist: bool) -> Result<&mut Self, CartError> {
        self.items.clear();
        debug!(session = %self.context.session_id, "cart cleared");

        if persist {
            self.save()?;
        }
        Ok(self)
    }

    /// Save the current items to every active backend, in order.
    ///
    /// Stops at the first failing backend and returns its error; the
    /// in-memory items are left as they are.
    pub fn save(&self) -> Result<(), CartError> {
        for backend in &self.storage {
            if let Err(e) = backend.save(self) {
                warn!(backend = backend.name(), error = %e, "cart save failed");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Items in the cart, optionally only those of `kind` or a sub-kind.
    pub fn items(&self, kind: Option<&ItemKind>) -> Vec<&CartItem> {
        self.items
            .iter()
            .filter(|item| kind.map_or(true, |k| item.kind.is_a(k)))
            .collect()
    }

    /// Number of distinct lines (not units) of `kind`.
    pub fn count(&self, kind: Option<&ItemKind>) -> usize {
        self.items(kind).len()
    }

    /// Sum of a numeric attribute over the items of `kind`.
    ///
    /// Fails with [`CartError::MissingAttribute`] on the first item without
    /// the attribute.
    pub fn attribute_total(
        &self,
        attribute: &str,
        kind: Option<&ItemKind>,
    ) -> Result<i64, CartError> {
        self.items(kind).into_iter().try_fold(0i64, |sum, item| {
            let value = item
                .attribute(attribute)
                .ok_or_else(|| CartError::MissingAttribute {
                    item: item.unique_id(),
                    attribute: attribute.to_string(),
                })?;
            sum.checked_add(value).ok_or(CartError::Overflow)
        })
    }

    /// Look up a line by unique id.
    pub fn get(&self, unique_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.unique_id() == unique_id)
    }

    /// Owned copy of all items, as written by storage backends.
    pub fn snapshot(&self) -> Vec<CartItem> {
        self.items.clone()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The owner this cart belongs to.
    pub fn context(&self) -> &CartContext {
        &self.context
    }

    /// Names of the active backends in registration order.
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.storage.iter().map(|b| b.name()).collect()
    }
}

impl std::fmt::Debug for Cart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cart")
            .field("context", &self.context)
            .field("items", &self.items)
            .field("storage", &self.backend_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        loads: Vec<&'static str>,
        saves: Vec<(&'static str, Vec<CartItem>)>,
    }

    struct Recording {
        name: &'static str,
        data: Option<Vec<CartItem>>,
        fail_save: bool,
        log: Rc<RefCell<Log>>,
    }

    impl Recording {
        fn new(name: &'static str, log: &Rc<RefCell<Log>>) -> Self {
            Self {
                name,
                data: None,
                fail_save: false,
                log: Rc::clone(log),
            }
        }

        fn with_data(mut self, items: Vec<CartItem>) -> Self {
            self.data = Some(items);
            self
        }

        fn failing(mut self) -> Self {
            self.fail_save = true;
            self
        }
    }

    impl StorageBackend for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn load(&self, _cart: &Cart) -> Result<Option<Vec<CartItem>>, CartError> {
            self.log.borrow_mut().loads.push(self.name);
            Ok(self.data.clone())
        }

        fn save(&self, cart: &Cart) -> Result<(), CartError> {
            if self.fail_save {
                return Err(CartError::DatabaseError("unavailable".into()));
            }
            self.log.borrow_mut().saves.push((self.name, cart.snapshot()));
            Ok(())
        }
    }

    fn context() -> CartContext {
        CartContext::guest("sess-1")
    }

    fn product(id: &str, price: i64) -> CartItem {
        CartItem::new(ItemKind::product(), id).with_attribute("price", price)
    }

    fn saved(quantity: i64, item: CartItem) -> CartItem {
        CartItem { quantity, ..item }
    }

    fn cart_with(log: &Rc<RefCell<Log>>) -> Cart {
        Cart::initialize(context(), [StorageRegistration::new(Recording::new("a", log))]).unwrap()
    }

    #[test]
    fn test_add_overwrites_quantity() {
        let mut cart = Cart::in_memory(context());
        let item = product("sku-1", 1000);
        let id = item.unique_id();

        cart.add(item.clone(), 3, false).unwrap();
        cart.add(item, 5, false).unwrap();

        assert_eq!(cart.count(None), 1);
        assert_eq!(cart.get(&id).unwrap().quantity, 5);
    }

    #[test]
    fn test_options_with_delimiters_stay_separate_lines() {
        let mut cart = Cart::in_memory(context());
        let one_option = product("tee", 100).with_option("note", "x&size=L");
        let two_options = product("tee", 900).with_option("note", "x").with_option("size", "L");

        cart.add(one_option, 1, false).unwrap();
        cart.add(two_options, 1, false).unwrap();

        assert_eq!(cart.count(None), 2);
        assert_eq!(cart.attribute_total("price", None).unwrap(), 1000);
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut cart = Cart::in_memory(context());
        cart.add(product("b", 1), 1, false).unwrap();
        cart.add(product("a", 1), 1, false).unwrap();
        cart.add(product("b", 1), 2, false).unwrap();

        let ids: Vec<&str> = cart.items(None).iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        let mut cart = Cart::in_memory(context());

        assert!(matches!(
            cart.add(product("sku-1", 1), 0, false),
            Err(CartError::InvalidQuantity(0))
        ));
        assert!(matches!(
            cart.add(product("sku-1", 1), -2, false),
            Err(CartError::InvalidQuantity(-2))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_chains() {
        let mut cart = Cart::in_memory(context());
        cart.add(product("a", 1), 1, false)
            .unwrap()
            .add(product("b", 1), 1, false)
            .unwrap();
        assert_eq!(cart.count(None), 2);
    }

    #[test]
    fn test_remove_zero_removes_line() {
        let mut cart = Cart::in_memory(context());
        let item = product("x", 1);
        let id = item.unique_id();
        cart.add(item, 4, false).unwrap();

        cart.remove(&id, 0, false).unwrap();
        assert!(cart.get(&id).is_none());
    }

    #[test]
    fn test_remove_partial() {
        let mut cart = Cart::in_memory(context());
        let item = product("x", 1);
        let id = item.unique_id();
        cart.add(item, 4, false).unwrap();

        cart.remove(&id, 1, false).unwrap();
        assert_eq!(cart.get(&id).unwrap().quantity, 3);
    }

    #[test]
    fn test_remove_beyond_stock() {
        let mut cart = Cart::in_memory(context());
        let item = product("x", 1);
        let id = item.unique_id();
        cart.add(item, 4, false).unwrap();

        cart.remove(&id, 10, false).unwrap();
        assert!(cart.get(&id).is_none());

        cart.add(product("x", 1), 4, false).unwrap();
        cart.remove(&id, 4, false).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_missing() {
        let mut cart = Cart::in_memory(context());
        cart.add(product("x", 1), 2, false).unwrap();

        let result = cart.remove("nonexistent", 0, false);
        assert!(matches!(result, Err(CartError::ItemNotFound(ref id)) if id == "nonexistent"));
        assert_eq!(cart.count(None), 1);
    }

    #[test]
    fn test_remove_negative_quantity() {
        let mut cart = Cart::in_memory(context());
        let item = product("x", 1);
        let id = item.unique_id();
        cart.add(item, 2, false).unwrap();

        assert!(matches!(
            cart.remove(&id, -1, false),
            Err(CartError::InvalidQuantity(-1))
        ));
        assert_eq!(cart.get(&id).unwrap().quantity, 2);
    }

    #[test]
    fn test_type_filter() {
        let mut cart = Cart::in_memory(context());
        let digital = ItemKind::product().child("digital");
        cart.add(product("book", 10), 1, false).unwrap();
        cart.add(CartItem::new(digital.clone(), "ebook"), 1, false).unwrap();
        cart.add(CartItem::new(ItemKind::new("gift-card"), "gc"), 1, false).unwrap();

        assert_eq!(cart.count(None), 3);
        assert_eq!(cart.count(Some(&ItemKind::product())), 2);
        assert_eq!(cart.count(Some(&digital)), 1);
        assert_eq!(
            cart.count(Some(&digital)),
            cart.items(Some(&digital)).len()
        );
    }

    #[test]
    fn test_count_is_lines_not_units() {
        let mut cart = Cart::in_memory(context());
        cart.add(product("a", 1), 5, false).unwrap();
        cart.add(product("b", 1), 7, false).unwrap();

        assert_eq!(cart.count(None), 2);
        assert_eq!(cart.attribute_total("quantity", None).unwrap(), 12);
    }

    #[test]
    fn test_attribute_total_with_filter() {
        let mut cart = Cart::in_memory(context());
        cart.add(product("a", 10), 1, false).unwrap();
        cart.add(product("b", 5), 1, false).unwrap();
        // No price, excluded by the filter
        cart.add(CartItem::new(ItemKind::new("service"), "install"), 1, false)
            .unwrap();

        let total = cart
            .attribute_total("price", Some(&ItemKind::product()))
            .unwrap();
        assert_eq!(total, 15);
    }

    #[test]
    fn test_attribute_total_missing_attribute() {
        let mut cart = Cart::in_memory(context());
        cart.add(product("a", 10), 1, false).unwrap();
        cart.add(CartItem::new(ItemKind::new("service"), "install"), 1, false)
            .unwrap();

        let result = cart.attribute_total("price", None);
        assert!(matches!(
            result,
            Err(CartError::MissingAttribute { ref item, ref attribute })
                if item == "service:install" && attribute == "price"
        ));
    }

    #[test]
    fn test_attribute_total_empty_cart() {
        let cart = Cart::in_memory(context());
        assert_eq!(cart.attribute_total("price", None).unwrap(), 0);
    }

    #[test]
    fn test_attribute_total_overflow() {
        let mut cart = Cart::in_memory(context());
        cart.add(product("a", i64::MAX), 1, false).unwrap();
        cart.add(product("b", 1), 1, false).unwrap();

        assert!(matches!(
            cart.attribute_total("price", None),
            Err(CartError::Overflow)
        ));
    }

    #[test]
    fn test_initialize_without_data_is_empty() {
        let log = Rc::new(RefCell::new(Log::default()));
        let cart = cart_with(&log);

        assert!(cart.is_empty());
        assert_eq!(log.borrow().loads, vec!["a"]);
        assert!(log.borrow().saves.is_empty());
    }

    #[test]
    fn test_load_precedence() {
        let log = Rc::new(RefCell::new(Log::default()));
        let first = vec![saved(2, product("first", 1))];
        let second = vec![saved(9, product("second", 1))];

        let cart = Cart::initialize(
            context(),
            [
                StorageRegistration::new(Recording::new("a", &log).with_data(first.clone())),
                StorageRegistration::new(Recording::new("b", &log).with_data(second)),
            ],
        )
        .unwrap();

        assert_eq!(cart.snapshot(), first);
        assert_eq!(log.borrow().loads, vec!["a"]);
    }

    #[test]
    fn test_load_skips_empty_results() {
        let log = Rc::new(RefCell::new(Log::default()));
        let second = vec![saved(1, product("second", 1))];

        let cart = Cart::initialize(
            context(),
            [
                StorageRegistration::new(Recording::new("a", &log).with_data(Vec::new())),
                StorageRegistration::new(Recording::new("b", &log).with_data(second.clone())),
            ],
        )
        .unwrap();

        assert_eq!(cart.snapshot(), second);
        assert_eq!(log.borrow().loads, vec!["a", "b"]);
    }

    #[test]
    fn test_load_drops_lines_without_quantity() {
        let log = Rc::new(RefCell::new(Log::default()));
        let data = vec![saved(0, product("zero", 1)), saved(3, product("ok", 1))];

        let cart = Cart::initialize(
            context(),
            [StorageRegistration::new(Recording::new("a", &log).with_data(data))],
        )
        .unwrap();

        assert_eq!(cart.count(None), 1);
        assert!(cart.get("product:ok").is_some());
    }

    #[test]
    fn test_condition_skips_backend() {
        let log = Rc::new(RefCell::new(Log::default()));
        let cart = Cart::initialize(
            context(),
            [
                StorageRegistration::new(Recording::new("guest", &log))
                    .when(|cart| cart.context().is_guest()),
                StorageRegistration::new(Recording::new("user", &log))
                    .when(|cart| !cart.context().is_guest()),
            ],
        )
        .unwrap();

        assert_eq!(cart.backend_names(), vec!["guest"]);
        assert_eq!(log.borrow().loads, vec!["guest"]);
    }

    #[test]
    fn test_condition_evaluated_once() {
        let log = Rc::new(RefCell::new(Log::default()));
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);

        let mut cart = Cart::initialize(
            context(),
            [StorageRegistration::new(Recording::new("a", &log)).when(move |_| {
                *counter.borrow_mut() += 1;
                true
            })],
        )
        .unwrap();
        cart.add(product("x", 1), 1, true).unwrap();
        cart.clear(true).unwrap();

        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_lazy_factory_not_called_when_inactive() {
        let built = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&built);

        let cart = Cart::initialize(
            context(),
            [StorageRegistration::lazy(move |_| {
                *flag.borrow_mut() = true;
                Err(CartError::ConfigError("should not be built".into()))
            })
            .when(|_| false)],
        )
        .unwrap();

        assert!(!*built.borrow());
        assert!(cart.backend_names().is_empty());
    }

    #[test]
    fn test_same_backend_name_replaces_in_place() {
        let log = Rc::new(RefCell::new(Log::default()));
        let replacement = vec![saved(1, product("replacement", 1))];

        let cart = Cart::initialize(
            context(),
            [
                StorageRegistration::new(Recording::new("a", &log)),
                StorageRegistration::new(Recording::new("b", &log)),
                StorageRegistration::new(Recording::new("a", &log).with_data(replacement.clone())),
            ],
        )
        .unwrap();

        assert_eq!(cart.backend_names(), vec!["a", "b"]);
        assert_eq!(cart.snapshot(), replacement);
    }

    #[test]
    fn test_mutations_save_to_every_backend() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut cart = Cart::initialize(
            context(),
            [
                StorageRegistration::new(Recording::new("a", &log)),
                StorageRegistration::new(Recording::new("b", &log)),
            ],
        )
        .unwrap();
        let item = product("x", 1);
        let id = item.unique_id();

        cart.add(item, 2, true).unwrap();
        cart.remove(&id, 1, true).unwrap();

        let log = log.borrow();
        let names: Vec<&str> = log.saves.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["a", "b", "a", "b"]);
        assert_eq!(log.saves[3].1[0].quantity, 1);
    }

    #[test]
    fn test_persist_false_does_not_save() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut cart = cart_with(&log);
        let item = product("x", 1);
        let id = item.unique_id();

        cart.add(item, 2, false).unwrap();
        cart.remove(&id, 1, false).unwrap();
        cart.clear(false).unwrap();

        assert!(cart.is_empty());
        assert!(log.borrow().saves.is_empty());
    }

    #[test]
    fn test_clear_persists() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut cart = cart_with(&log);
        cart.add(product("x", 1), 2, false).unwrap();

        cart.clear(true).unwrap();

        let log = log.borrow();
        assert_eq!(log.saves.len(), 1);
        assert!(log.saves[0].1.is_empty());
    }

    #[test]
    fn test_save_aborts_on_first_failure() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut cart = Cart::initialize(
            context(),
            [
                StorageRegistration::new(Recording::new("broken", &log).failing()),
                StorageRegistration::new(Recording::new("b", &log)),
            ],
        )
        .unwrap();

        let result = cart.add(product("x", 1), 1, true);

        assert!(matches!(result, Err(CartError::DatabaseError(_))));
        assert!(log.borrow().saves.is_empty());
        // In-memory state is kept
        assert_eq!(cart.count(None), 1);
    }
}

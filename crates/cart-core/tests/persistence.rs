//! End-to-end persistence through the session and database backends.

use cart_core::prelude::*;
use cart_db::Db;
use cart_kv::Cache;

fn book() -> CartItem {
    CartItem::new(ItemKind::product(), "rust-book").with_attribute("price", 4999)
}

fn ebook() -> CartItem {
    CartItem::new(ItemKind::product().child("digital"), "rust-ebook").with_attribute("price", 1999)
}

fn both(cache: &Cache, db: &Db) -> Vec<StorageRegistration> {
    vec![
        StorageRegistration::new(SessionStorage::new(cache.clone())),
        StorageRegistration::new(DatabaseStorage::new(db.clone()).unwrap()),
    ]
}

#[test]
fn test_cart_survives_requests() {
    let cache = Cache::in_memory();
    let db = Db::open_in_memory().unwrap();
    let context = CartContext::guest("sess-1");

    {
        let mut cart = Cart::initialize(context.clone(), both(&cache, &db)).unwrap();
        cart.add(book(), 2, true).unwrap();
        cart.add(ebook(), 1, true).unwrap();
    }

    let mut cart = Cart::initialize(context.clone(), both(&cache, &db)).unwrap();
    assert_eq!(cart.count(None), 2);
    assert_eq!(cart.attribute_total("price", None).unwrap(), 4999 + 1999);
    assert_eq!(cart.attribute_total("quantity", None).unwrap(), 3);

    cart.remove(&book().unique_id(), 1, true).unwrap();
    let cart = Cart::initialize(context, both(&cache, &db)).unwrap();
    assert_eq!(cart.get(&book().unique_id()).unwrap().quantity, 1);
}

#[test]
fn test_session_wins_over_database() {
    let cache = Cache::in_memory();
    let db = Db::open_in_memory().unwrap();
    let context = CartContext::guest("sess-1");

    // Only the database knows about the book
    let mut db_only = Cart::initialize(
        context.clone(),
        [StorageRegistration::new(DatabaseStorage::new(db.clone()).unwrap())],
    )
    .unwrap();
    db_only.add(book(), 1, true).unwrap();

    // Only the session knows about the ebook
    let mut session_only = Cart::initialize(
        context.clone(),
        [StorageRegistration::new(SessionStorage::new(cache.clone()))],
    )
    .unwrap();
    session_only.add(ebook(), 1, true).unwrap();

    let cart = Cart::initialize(context, both(&cache, &db)).unwrap();
    assert_eq!(cart.snapshot(), session_only.snapshot());
}

#[test]
fn test_guest_then_login_with_conditions() {
    let cache = Cache::in_memory();
    let db = Db::open_in_memory().unwrap();

    let registrations = |cache: &Cache, db: &Db| {
        vec![
            StorageRegistration::new(SessionStorage::new(cache.clone()))
                .when(|cart| cart.context().is_guest()),
            StorageRegistration::new(DatabaseStorage::new(db.clone()).unwrap())
                .when(|cart| !cart.context().is_guest()),
        ]
    };

    let mut guest =
        Cart::initialize(CartContext::guest("sess-1"), registrations(&cache, &db)).unwrap();
    assert_eq!(guest.backend_names(), vec!["session"]);
    guest.add(book(), 1, true).unwrap();

    // After login the database backend alone is active and holds nothing yet
    let mut user = Cart::initialize(
        CartContext::user("sess-1", "user-1"),
        registrations(&cache, &db),
    )
    .unwrap();
    assert_eq!(user.backend_names(), vec!["database"]);
    assert!(user.is_empty());
    user.add(ebook(), 4, true).unwrap();

    // A new session for the same user sees the saved cart
    let user = Cart::initialize(
        CartContext::user("sess-2", "user-1"),
        registrations(&cache, &db),
    )
    .unwrap();
    assert_eq!(user.count(Some(&ItemKind::new("product/digital"))), 1);
}

#[test]
fn test_clear_without_persist_keeps_saved_cart() {
    let cache = Cache::in_memory();
    let db = Db::open_in_memory().unwrap();
    let context = CartContext::guest("sess-1");

    let mut cart = Cart::initialize(context.clone(), both(&cache, &db)).unwrap();
    cart.add(book(), 2, true).unwrap();
    cart.clear(false).unwrap();
    assert!(cart.is_empty());

    let reloaded = Cart::initialize(context, both(&cache, &db)).unwrap();
    assert_eq!(reloaded.count(None), 1);
}

#[test]
fn test_config_registrations_round_trip() {
    let config = CartConfig {
        storage: vec![
            StorageConfig::new(BackendKind::Session).with_store("persistence-test-store"),
        ],
    };
    config.validate().unwrap();

    let context = CartContext::guest("sess-config");
    let mut cart = Cart::initialize(context.clone(), config.registrations()).unwrap();
    cart.add(book(), 3, true).unwrap();

    let cart = Cart::initialize(context, config.registrations()).unwrap();
    assert_eq!(cart.attribute_total("quantity", None).unwrap(), 3);
}

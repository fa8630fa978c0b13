//! Shopping cart module.
//!
//! Contains the cart aggregate and its line items.

mod cart;
mod item;

pub use cart::Cart;
pub use item::{CartItem, ItemKind, QUANTITY_ATTRIBUTE};

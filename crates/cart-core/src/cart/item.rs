//! Line items and item kinds.

use crate::ids::ProductId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use urlencoding::encode;

/// Name under which [`CartItem::attribute`] exposes the quantity.
pub const QUANTITY_ATTRIBUTE: &str = "quantity";

/// Hierarchical item type tag, e.g. `product` or `product/digital`.
///
/// A kind is a descendant of every kind on its path, so filtering by
/// `product` also selects `product/digital` items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKind(String);

impl ItemKind {
    /// Create a kind from a slash-separated path.
    pub fn new(path: impl AsRef<str>) -> Self {
        let path = path
            .as_ref()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        Self(path)
    }

    /// The `product` kind.
    pub fn product() -> Self {
        Self::new("product")
    }

    /// A sub-kind of this kind.
    pub fn child(&self, name: &str) -> Self {
        Self::new(format!("{}/{}", self.0, name))
    }

    /// The direct parent kind, if any.
    pub fn parent(&self) -> Option<Self> {
        self.0.rsplit_once('/').map(|(parent, _)| Self(parent.to_string()))
    }

    /// True if this kind equals `other` or descends from it. The empty kind
    /// is the root: every kind is one.
    pub fn is_a(&self, other: &ItemKind) -> bool {
        if other.0.is_empty() {
            return true;
        }
        match self.0.strip_prefix(other.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Get the kind path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemKind {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One line in the cart.
///
/// The cart owns `quantity`: it is overwritten when the item is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Item type used for filtering.
    pub kind: ItemKind,
    /// Product this line refers to.
    pub product_id: ProductId,
    /// Chosen options (size, colour, ...). Part of the line identity.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
    /// Number of units.
    #[serde(default)]
    pub quantity: i64,
    /// Named numeric attributes, e.g. `price` in minor currency units.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, i64>,
}

impl CartItem {
    /// Create an item with no options or attributes.
    pub fn new(kind: ItemKind, product_id: impl Into<ProductId>) -> Self {
        Self {
            kind,
            product_id: product_id.into(),
            options: BTreeMap::new(),
            quantity: 0,
            attributes: BTreeMap::new(),
        }
    }

    /// Add a chosen option.
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Add a numeric attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: i64) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Identity of the cart line: kind, product and options.
    ///
    /// Options are ordered by name, so the same choices always give the same
    /// id: `product:sku-1?color=red&size=L`. Every component is
    /// percent-encoded (kind segments keep their `/`), so distinct items never
    /// share an id.
    pub fn unique_id(&self) -> String {
        let kind = self
            .kind
            .as_str()
            .split('/')
            .map(|segment| encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let mut id = format!("{}:{}", kind, encode(self.product_id.as_str()));
        for (i, (name, value)) in self.options.iter().enumerate() {
            id.push(if i == 0 { '?' } else { '&' });
            id.push_str(&encode(name));
            id.push('=');
            id.push_str(&encode(value));
        }
        id
    }

    /// Read a numeric attribute. `quantity` always resolves to the quantity
    /// field.
    pub fn attribute(&self, name: &str) -> Option<i64> {
        if name == QUANTITY_ATTRIBUTE {
            return Some(self.quantity);
        }
        self.attributes.get(name).copied()
    }
}

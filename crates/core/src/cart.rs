//! Session cart.
//!
//! The cart lives in the visitor's session, not in the data service. Lines
//! are keyed on product plus chosen size and colour, so the same product in
//! two sizes occupies two lines. All quantity math floors at one - a line
//! either exists with at least one unit or does not exist at all.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Identity of a cart line: product plus the chosen variant options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: ProductId,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// The product fields a cart line needs to render and check out.
///
/// Captured at add time so the cart stays renderable even if the catalog
/// row changes underneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image_url: String,
    pub is_digital_tool: bool,
}

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: ProductSnapshot,
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl CartLine {
    /// The key this line is merged and addressed under.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product.id.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.saturating_mul(self.quantity)
    }
}

/// The visitor's cart. Serialized into the session between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartStore {
    lines: Vec<CartLine>,
}

impl CartStore {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add a product to the cart.
    ///
    /// A quantity of zero is treated as one. If a line with the same
    /// product, size and colour already exists, the quantities are summed;
    /// otherwise a new line is appended at the end.
    pub fn add_item(
        &mut self,
        product: ProductSnapshot,
        quantity: u32,
        size: Option<String>,
        color: Option<String>,
    ) {
        let quantity = quantity.max(1);
        let key = LineKey {
            product_id: product.id.clone(),
            size: size.clone(),
            color: color.clone(),
        };

        if let Some(line) = self.lines.iter_mut().find(|line| line.key() == key) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine {
                product,
                quantity,
                size,
                color,
            });
        }
    }

    /// Remove the line with the given key. No-op if no such line exists.
    pub fn remove_item(&mut self, key: &LineKey) {
        self.lines.retain(|line| line.key() != *key);
    }

    /// Adjust the quantity of the line with the given key by `delta`,
    /// flooring at one unit. No-op if no such line exists.
    pub fn update_quantity(&mut self, key: &LineKey, delta: i64) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.key() == *key) {
            let next = i64::from(line.quantity).saturating_add(delta).max(1);
            line.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total number of units across all lines. This is what the cart badge
    /// shows, so three of one shirt counts as three.
    #[must_use]
    pub fn total_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Sum of line totals, before delivery charge.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines (not units).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shirt() -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new("p1"),
            name: "Polo Shirt".to_owned(),
            price: Price::new(1250),
            image_url: "https://cdn.example.com/p1.jpg".to_owned(),
            is_digital_tool: false,
        }
    }

    fn tool() -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new("t1"),
            name: "Design Suite".to_owned(),
            price: Price::new(500),
            image_url: "https://cdn.example.com/t1.jpg".to_owned(),
            is_digital_tool: true,
        }
    }

    fn key(product_id: &str, size: Option<&str>, color: Option<&str>) -> LineKey {
        LineKey {
            product_id: ProductId::new(product_id),
            size: size.map(str::to_owned),
            color: color.map(str::to_owned),
        }
    }

    #[test]
    fn test_add_merges_matching_variant() {
        let mut cart = CartStore::new();
        cart.add_item(shirt(), 1, Some("M".into()), Some("Black".into()));
        cart.add_item(shirt(), 2, Some("M".into()), Some("Black".into()));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_add_keeps_different_variants_separate() {
        let mut cart = CartStore::new();
        cart.add_item(shirt(), 1, Some("M".into()), None);
        cart.add_item(shirt(), 1, Some("L".into()), None);
        cart.add_item(shirt(), 1, Some("M".into()), Some("Black".into()));

        assert_eq!(cart.len(), 3);
        assert_eq!(cart.total_count(), 3);
    }

    #[test]
    fn test_add_zero_quantity_becomes_one() {
        let mut cart = CartStore::new();
        cart.add_item(shirt(), 0, None, None);

        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn test_update_quantity_floors_at_one() {
        let mut cart = CartStore::new();
        cart.add_item(shirt(), 1, None, None);

        cart.update_quantity(&key("p1", None, None), -5);
        assert_eq!(cart.lines()[0].quantity, 1);

        cart.update_quantity(&key("p1", None, None), 2);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_update_quantity_absent_key_is_noop() {
        let mut cart = CartStore::new();
        cart.add_item(shirt(), 2, None, None);

        cart.update_quantity(&key("p1", Some("M"), None), 5);
        cart.update_quantity(&key("missing", None, None), 5);

        assert_eq!(cart.total_count(), 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = CartStore::new();
        cart.add_item(shirt(), 1, None, None);
        cart.add_item(tool(), 1, None, None);

        let k = key("p1", None, None);
        cart.remove_item(&k);
        cart.remove_item(&k);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].product.id, ProductId::new("t1"));
    }

    #[test]
    fn test_subtotal_and_count() {
        let mut cart = CartStore::new();
        cart.add_item(shirt(), 3, None, None);
        cart.add_item(tool(), 1, None, None);

        assert_eq!(cart.subtotal(), Price::new(3 * 1250 + 500));
        assert_eq!(cart.total_count(), 4);
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut cart = CartStore::new();
        cart.add_item(shirt(), 2, None, None);
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.total_count(), 0);
        assert_eq!(cart.subtotal(), Price::ZERO);
    }

    #[test]
    fn test_worked_scenario() {
        // Add three shirts in one line, shrink the line back down, then
        // remove it outright.
        let mut cart = CartStore::new();
        cart.add_item(shirt(), 1, Some("M".into()), None);
        cart.add_item(shirt(), 2, Some("M".into()), None);
        assert_eq!(cart.subtotal(), Price::new(3750));

        cart.update_quantity(&key("p1", Some("M"), None), -10);
        assert_eq!(cart.total_count(), 1);

        cart.remove_item(&key("p1", Some("M"), None));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_session_serde_round_trip() {
        let mut cart = CartStore::new();
        cart.add_item(shirt(), 2, Some("M".into()), Some("Black".into()));

        let json = serde_json::to_string(&cart).unwrap();
        let restored: CartStore = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }
}

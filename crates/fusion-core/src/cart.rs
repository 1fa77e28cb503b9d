//! Cart store.
//!
//! Lines are keyed by product id and kept in insertion order for display.
//! Quantities never drop below 1; removing a line is an explicit operation.

use fusion_types::cart::CartItem;
use fusion_types::catalog::{Product, ProductId};
use fusion_types::money::Price;
use tokio::sync::watch;

/// Snapshot of the cart contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Build a cart from persisted lines. Duplicate ids are merged and
    /// zero quantities are raised to 1.
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Cart::default();
        for mut item in items {
            item.quantity = item.quantity.max(1);
            match cart.position(item.id) {
                Some(idx) => {
                    let line = &mut cart.items[idx];
                    line.quantity = line.quantity.saturating_add(item.quantity);
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    fn position(&self, id: ProductId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

/// Owner of the cart. Mutations publish the new [`Cart`] to subscribers.
pub struct CartStore {
    tx: watch::Sender<Cart>,
}

impl CartStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Cart::default());
        Self { tx }
    }

    /// Add one unit of `product`, creating the line if needed.
    pub fn add(&self, product: &Product) {
        self.add_item(CartItem::from_product(product));
    }

    /// Add a line; if the product is already in the cart its quantity grows by
    /// `item.quantity` (saturating at `u32::MAX`) and the stored name/price
    /// are left as first added.
    pub fn add_item(&self, item: CartItem) {
        let id = item.id;
        self.tx.send_modify(|cart| {
            let quantity = item.quantity.max(1);
            match cart.position(id) {
                Some(idx) => {
                    let line = &mut cart.items[idx];
                    line.quantity = line.quantity.saturating_add(quantity);
                }
                None => cart.items.push(CartItem { quantity, ..item }),
            }
        });
        tracing::debug!(product_id = %id, "cart line added");
    }

    /// Set a line's quantity, clamped to at least 1. Unknown ids are ignored.
    pub fn set_quantity(&self, id: ProductId, quantity: u32) {
        self.tx.send_if_modified(|cart| match cart.position(id) {
            Some(idx) => {
                cart.items[idx].quantity = quantity.max(1);
                true
            }
            None => false,
        });
    }

    pub fn remove(&self, id: ProductId) {
        self.tx.send_if_modified(|cart| match cart.position(id) {
            Some(idx) => {
                cart.items.remove(idx);
                true
            }
            None => false,
        });
    }

    pub fn clear(&self) {
        self.tx.send_modify(|cart| cart.items.clear());
        tracing::debug!("cart cleared");
    }

    /// Load persisted lines at startup without notifying existing subscribers.
    pub fn restore(&self, items: Vec<CartItem>) {
        self.tx.send_replace(Cart::from_items(items));
    }

    pub fn snapshot(&self) -> Cart {
        self.tx.borrow().clone()
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.tx.borrow().items.clone()
    }

    pub fn item_count(&self) -> u64 {
        self.tx.borrow().item_count()
    }

    pub fn total(&self) -> Price {
        self.tx.borrow().total()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.tx.subscribe()
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn product(id: i64, name: &str, price: &str) -> Product {
        Product {
            id: ProductId(id),
            category: "General".to_string(),
            name: name.to_string(),
            description: String::new(),
            price: price.parse().unwrap(),
            quantity: 100,
            image: format!("http://127.0.0.1:8000/media/{id}.png"),
            ai_meta_title: None,
            ai_meta_description: None,
            ai_keywords: None,
            ai_tags: None,
        }
    }

    #[test]
    fn add_twice_merges_into_one_line() {
        let store = CartStore::new();
        let mug = product(1, "Mug", "19.99");
        store.add(&mug);
        store.add(&mug);

        let items = store.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(store.item_count(), 2);
    }

    #[test]
    fn removing_only_item_empties_cart() {
        let store = CartStore::new();
        store.add(&product(1, "Mug", "19.99"));
        store.remove(ProductId(1));
        assert!(store.is_empty());
        assert_eq!(store.item_count(), 0);
        assert_eq!(store.total(), Price::ZERO);
    }

    #[test]
    fn total_is_exact() {
        let store = CartStore::new();
        let mug = product(1, "Mug", "19.99");
        store.add(&mug);
        store.add(&mug);
        store.add(&product(2, "Coaster", "5.00"));

        assert_eq!(store.total().to_string(), "44.98");
        assert_eq!(store.total().cents(), 4498);
        assert_eq!(store.item_count(), 3);
    }

    #[test]
    fn set_quantity_clamps_and_ignores_unknown() {
        let store = CartStore::new();
        store.add(&product(1, "Mug", "19.99"));

        store.set_quantity(ProductId(1), 0);
        assert_eq!(store.items()[0].quantity, 1);

        store.set_quantity(ProductId(1), 4);
        assert_eq!(store.items()[0].quantity, 4);

        store.set_quantity(ProductId(99), 3);
        assert_eq!(store.items().len(), 1);
    }

    #[test]
    fn insertion_order_is_kept() {
        let store = CartStore::new();
        store.add(&product(3, "C", "1.00"));
        store.add(&product(1, "A", "1.00"));
        store.add(&product(3, "C", "1.00"));
        let ids: Vec<i64> = store.items().iter().map(|i| i.id.0).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn restore_merges_duplicates() {
        let store = CartStore::new();
        let line = CartItem::from_product(&product(1, "Mug", "19.99"));
        store.restore(vec![line.clone(), CartItem { quantity: 0, ..line }]);
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].quantity, 2);
    }

    #[test]
    fn quantities_saturate_instead_of_overflowing() {
        let store = CartStore::new();
        let mug = product(1, "Mug", "1.00");
        store.add(&mug);
        store.set_quantity(ProductId(1), u32::MAX);
        store.add(&mug);
        assert_eq!(store.items()[0].quantity, u32::MAX);

        store.add(&product(2, "Coaster", "1.00"));
        store.set_quantity(ProductId(2), u32::MAX);
        assert_eq!(store.item_count(), 2 * u64::from(u32::MAX));
        assert_eq!(store.total().cents(), 2 * 100 * i64::from(u32::MAX));

        let line = CartItem::from_product(&mug);
        let restored = Cart::from_items(vec![
            CartItem { quantity: u32::MAX, ..line.clone() },
            CartItem { quantity: 5, ..line },
        ]);
        assert_eq!(restored.items()[0].quantity, u32::MAX);
    }

    #[tokio::test]
    async fn unknown_id_does_not_notify() {
        let store = CartStore::new();
        let mut rx = store.subscribe();
        store.remove(ProductId(42));
        assert!(!rx.has_changed().unwrap());

        store.add(&product(1, "Mug", "19.99"));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().item_count(), 1);
    }
}

//! Cart line items.

use serde::{Deserialize, Serialize};

use crate::catalog::{Product, ProductId};
use crate::money::Price;

/// One cart line. Persisted under the `cartItems` storage key and sent as-is
/// to the payment-intent endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartItem {
    /// A fresh line for `product` with quantity 1.
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity: 1,
        }
    }

    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}

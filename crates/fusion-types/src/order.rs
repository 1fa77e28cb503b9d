//! Orders and payment-intent exchange types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::catalog::Product;
use crate::money::Price;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub product: Product,
    /// Unit price at purchase time.
    pub price: Price,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub total_price: Price,
    pub paid: bool,
    pub items: Vec<OrderItem>,
}

/// Body of `POST /orders/create-payment-intent/`.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntentRequest<'a> {
    pub items: &'a [CartItem],
}

/// The payment handle: a short-lived client secret authorizing one
/// confirmation attempt with the payment processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

impl PaymentIntent {
    /// The intent id embedded in the client secret (`pi_123_secret_abc` -> `pi_123`).
    pub fn intent_id(&self) -> Option<&str> {
        self.client_secret
            .split_once("_secret_")
            .map(|(id, _)| id)
            .filter(|id| !id.is_empty())
    }
}

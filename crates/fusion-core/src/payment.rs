//! Checkout: payment handle from the backend, confirmation with the processor.
//!
//! Card data never passes through this client. The processor adapter receives
//! the client secret and an opaque payment-method reference only.

use fusion_types::error::PaymentError;
use fusion_types::money::Price;
use fusion_types::order::PaymentIntent;

use crate::api::{ApiClient, HttpTransport};
use crate::cart::CartStore;

pub const SERVER_FALLBACK: &str = "Could not process payment.";
pub const PROCESSOR_FALLBACK: &str = "An unexpected error occurred during payment.";

/// Result of a confirmation call as reported by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub intent_id: String,
    /// Processor status string, e.g. `succeeded` or `requires_action`.
    pub status: String,
}

impl PaymentConfirmation {
    pub fn succeeded(&self) -> bool {
        self.status == "succeeded"
    }
}

/// Confirms payment intents with the external processor.
///
/// Implementations map processor rejections to [`PaymentError::Processor`]
/// with the processor's message, or [`PROCESSOR_FALLBACK`] when it has none.
pub trait PaymentProcessor: Send + Sync {
    fn confirm(
        &self,
        intent: &PaymentIntent,
        payment_method: &str,
    ) -> impl std::future::Future<Output = Result<PaymentConfirmation, PaymentError>> + Send;
}

/// Summary of a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub intent_id: String,
    pub total: Price,
    pub item_count: u64,
}

/// Pay for the current cart. On success the cart is cleared.
///
/// Backend and processor rejections both come back as [`PaymentError`]
/// carrying a message fit to show the user as-is.
pub async fn checkout<T, P>(
    api: &ApiClient<T>,
    processor: &P,
    cart: &CartStore,
    payment_method: &str,
) -> Result<Receipt, PaymentError>
where
    T: HttpTransport,
    P: PaymentProcessor,
{
    let snapshot = cart.snapshot();
    if snapshot.is_empty() {
        return Err(PaymentError::EmptyCart);
    }

    let intent = api
        .create_payment_intent(snapshot.items())
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "payment intent rejected");
            PaymentError::Server(err.user_message(SERVER_FALLBACK))
        })?;

    let confirmation = processor.confirm(&intent, payment_method).await?;

    if !confirmation.succeeded() {
        tracing::warn!(status = %confirmation.status, "payment not completed");
        return Err(PaymentError::Processor(format!(
            "Payment was not completed (status: {}).",
            confirmation.status
        )));
    }

    cart.clear();
    tracing::info!(intent_id = %confirmation.intent_id, total = %snapshot.total(), "payment succeeded");
    Ok(Receipt {
        intent_id: confirmation.intent_id,
        total: snapshot.total(),
        item_count: snapshot.item_count(),
    })
}

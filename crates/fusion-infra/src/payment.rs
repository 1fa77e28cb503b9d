//! Stripe-style payment processor client.
//!
//! Confirms a payment intent with the publishable key, as a browser client
//! would: `POST {api}/v1/payment_intents/{id}/confirm` with the intent's client
//! secret and an opaque payment-method reference. No card data is handled.

use std::time::Duration;

use fusion_core::payment::{PROCESSOR_FALLBACK, PaymentConfirmation, PaymentProcessor};
use fusion_types::config::PaymentConfig;
use fusion_types::error::PaymentError;
use fusion_types::order::PaymentIntent;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

pub struct StripeProcessor {
    client: reqwest::Client,
    api_base_url: String,
    publishable_key: SecretString,
}

#[derive(Deserialize)]
struct ConfirmedIntent {
    id: String,
    status: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// The processor's own error message, if the body carries one.
fn processor_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .filter(|message| !message.trim().is_empty())
}

fn fallback() -> PaymentError {
    PaymentError::Processor(PROCESSOR_FALLBACK.to_string())
}

impl StripeProcessor {
    /// Fails with [`PaymentError::NotConfigured`] when no publishable key is set.
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let key = config
            .publishable_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(PaymentError::NotConfigured)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                tracing::warn!(error = %e, "failed to build payment HTTP client");
                fallback()
            })?;
        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            publishable_key: SecretString::from(key),
        })
    }

    fn confirm_url(&self, intent_id: &str) -> String {
        format!("{}/v1/payment_intents/{intent_id}/confirm", self.api_base_url)
    }
}

impl PaymentProcessor for StripeProcessor {
    async fn confirm(
        &self,
        intent: &PaymentIntent,
        payment_method: &str,
    ) -> Result<PaymentConfirmation, PaymentError> {
        let Some(intent_id) = intent.intent_id() else {
            tracing::warn!("client secret does not name a payment intent");
            return Err(fallback());
        };

        let response = self
            .client
            .post(self.confirm_url(intent_id))
            .bearer_auth(self.publishable_key.expose_secret())
            .form(&[
                ("client_secret", intent.client_secret.as_str()),
                ("payment_method", payment_method),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "payment processor unreachable");
                fallback()
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::warn!(error = %e, "failed to read processor response");
            fallback()
        })?;

        if !status.is_success() {
            tracing::info!(status = status.as_u16(), "payment processor rejected confirmation");
            return Err(processor_message(&body).map_or_else(fallback, PaymentError::Processor));
        }

        let confirmed: ConfirmedIntent = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, "unexpected processor response");
            fallback()
        })?;
        Ok(PaymentConfirmation {
            intent_id: confirmed.id,
            status: confirmed.status,
        })
    }
}

//! Client configuration types.
//!
//! [`ClientConfig`] is loaded from `config.toml` in the data directory
//! (`~/.fusion/` by default). Every field has a default so a missing or
//! partial file still yields a usable configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// REST API root, without trailing slash.
    pub api_base_url: String,
    /// Socket root, without trailing slash.
    pub ws_base_url: String,
    /// Items per page on paginated lists.
    pub page_size: u32,
    /// Grace period between a chat auth failure and the forced logout.
    pub auth_failure_logout_delay_secs: u64,
    pub reconnect: ReconnectConfig,
    pub payment: PaymentConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api".to_string(),
            ws_base_url: "ws://127.0.0.1:8000".to_string(),
            page_size: 6,
            auth_failure_logout_delay_secs: 5,
            reconnect: ReconnectConfig::default(),
            payment: PaymentConfig::default(),
        }
    }
}

/// Chat socket reconnection backoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    /// Fraction of the delay randomized in either direction (0.0 disables).
    pub jitter: f64,
    /// Give up after this many consecutive failed attempts. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 3_000,
            max_delay_ms: 30_000,
            multiplier: 2.0,
            jitter: 0.2,
            max_attempts: Some(10),
        }
    }
}

/// Payment processor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    /// Publishable (client-side) key. Checkout is disabled when unset.
    pub publishable_key: Option<String>,
    pub api_base_url: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            publishable_key: None,
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.page_size, 6);
        assert_eq!(config.auth_failure_logout_delay_secs, 5);
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000/api");
        assert!(config.payment.publishable_key.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
api_base_url = "https://shop.example.com/api"

[reconnect]
max_attempts = 3
"#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "https://shop.example.com/api");
        assert_eq!(config.ws_base_url, "ws://127.0.0.1:8000");
        assert_eq!(config.reconnect.max_attempts, Some(3));
        assert_eq!(config.reconnect.initial_delay_ms, 3_000);
    }
}

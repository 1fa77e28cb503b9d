//! Client configuration loader.
//!
//! Reads `config.toml` from the data directory (`~/.fusion/` by default) and
//! deserializes it into [`ClientConfig`]. Falls back to defaults when the file
//! is missing or malformed. Environment variables override file values.

use std::path::{Path, PathBuf};

use fusion_types::config::ClientConfig;

pub const ENV_DATA_DIR: &str = "FUSION_DATA_DIR";
pub const ENV_API_URL: &str = "FUSION_API_URL";
pub const ENV_WS_URL: &str = "FUSION_WS_URL";
pub const ENV_PUBLISHABLE_KEY: &str = "FUSION_PUBLISHABLE_KEY";

/// Load client configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ClientConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - Environment overrides are applied on top in every case.
pub async fn load_client_config(data_dir: &Path) -> ClientConfig {
    let config = read_config_file(data_dir).await;
    apply_env_overrides(config, |name| std::env::var(name).ok())
}

async fn read_config_file(data_dir: &Path) -> ClientConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ClientConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ClientConfig::default();
        }
    };

    match toml::from_str::<ClientConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ClientConfig::default()
        }
    }
}

/// Apply `FUSION_*` overrides. `lookup` returns the value of a variable, if set.
/// Empty values are ignored.
pub fn apply_env_overrides<F>(mut config: ClientConfig, lookup: F) -> ClientConfig
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = get(ENV_API_URL) {
        config.api_base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(url) = get(ENV_WS_URL) {
        config.ws_base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(key) = get(ENV_PUBLISHABLE_KEY) {
        config.payment.publishable_key = Some(key);
    }
    config
}

/// Resolve the data directory.
///
/// Checks `FUSION_DATA_DIR` first, then falls back to `~/.fusion`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".fusion");
    }

    PathBuf::from(".fusion")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[tokio::test]
    async fn missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = read_config_file(tmp.path()).await;
        assert_eq!(config, ClientConfig::default());
    }

    #[tokio::test]
    async fn partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
api_base_url = "https://shop.example.com/api"
page_size = 12

[reconnect]
max_attempts = 3

[payment]
publishable_key = "pk_test_123"
"#,
        )
        .await
        .unwrap();

        let config = read_config_file(tmp.path()).await;
        assert_eq!(config.api_base_url, "https://shop.example.com/api");
        assert_eq!(config.page_size, 12);
        assert_eq!(config.reconnect.max_attempts, Some(3));
        assert_eq!(config.reconnect.initial_delay_ms, 3_000);
        assert_eq!(config.payment.publishable_key.as_deref(), Some("pk_test_123"));
        assert_eq!(config.ws_base_url, ClientConfig::default().ws_base_url);
    }

    #[tokio::test]
    async fn malformed_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "page_size = [not valid")
            .await
            .unwrap();
        let config = read_config_file(tmp.path()).await;
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_API_URL, "https://api.example.com/api/"),
            (ENV_WS_URL, "wss://api.example.com"),
            (ENV_PUBLISHABLE_KEY, "pk_live_1"),
        ]);
        let config = apply_env_overrides(ClientConfig::default(), |name| {
            env.get(name).map(|v| v.to_string())
        });
        assert_eq!(config.api_base_url, "https://api.example.com/api");
        assert_eq!(config.ws_base_url, "wss://api.example.com");
        assert_eq!(config.payment.publishable_key.as_deref(), Some("pk_live_1"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let config = apply_env_overrides(ClientConfig::default(), |name| {
            (name == ENV_API_URL).then(|| "  ".to_string())
        });
        assert_eq!(config, ClientConfig::default());
        assert_eq!(apply_env_overrides(ClientConfig::default(), no_env), ClientConfig::default());
    }
}

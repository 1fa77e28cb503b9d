//! OS keychain storage for the session tokens.
//!
//! Uses the `keyring` crate (macOS Keychain, Windows Credential Manager,
//! Linux kernel keyring). The access and refresh tokens live in the keychain;
//! every other key goes to the wrapped fallback storage. When the platform has
//! no usable keychain the tokens fall back to that storage as well.

use fusion_core::persistence::{StateStorage, StorageKey};
use fusion_types::error::StorageError;

/// Default keychain service name.
pub const SERVICE_NAME: &str = "fusion";

/// Routes [`StorageKey::AuthToken`] and [`StorageKey::RefreshToken`] to the
/// OS keychain and everything else to `fallback`.
pub struct KeychainStorage<S> {
    access: keyring::Entry,
    refresh: keyring::Entry,
    fallback: S,
}

impl<S: StateStorage> KeychainStorage<S> {
    pub fn new(fallback: S) -> Result<Self, StorageError> {
        Self::with_service(SERVICE_NAME, fallback)
    }

    /// Keychain storage under a custom service name (useful for testing).
    pub fn with_service(service: &str, fallback: S) -> Result<Self, StorageError> {
        Ok(Self {
            access: entry(service, StorageKey::AuthToken)?,
            refresh: entry(service, StorageKey::RefreshToken)?,
            fallback,
        })
    }

    fn secret_entry(&self, key: StorageKey) -> Option<&keyring::Entry> {
        match key {
            StorageKey::AuthToken => Some(&self.access),
            StorageKey::RefreshToken => Some(&self.refresh),
            StorageKey::CartItems | StorageKey::AuthUser => None,
        }
    }
}

fn entry(service: &str, key: StorageKey) -> Result<keyring::Entry, StorageError> {
    keyring::Entry::new(service, key.as_str())
        .map_err(|e| StorageError::Io(format!("keychain entry error: {e}")))
}

impl<S: StateStorage> StateStorage for KeychainStorage<S> {
    async fn read(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        let Some(entry) = self.secret_entry(key) else {
            return self.fallback.read(key).await;
        };
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            // Also picks up tokens written before the keychain was used.
            Err(keyring::Error::NoEntry) => self.fallback.read(key).await,
            Err(err) => {
                tracing::warn!(%key, error = %err, "keychain read failed, using file storage");
                self.fallback.read(key).await
            }
        }
    }

    async fn write(&self, key: StorageKey, value: String) -> Result<(), StorageError> {
        let Some(entry) = self.secret_entry(key) else {
            return self.fallback.write(key, value).await;
        };
        match entry.set_password(&value) {
            Ok(()) => {
                // Drop any copy left in the fallback.
                self.fallback.remove(key).await
            }
            Err(err) => {
                tracing::warn!(%key, error = %err, "keychain write failed, using file storage");
                self.fallback.write(key, value).await
            }
        }
    }

    async fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        if let Some(entry) = self.secret_entry(key) {
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(err) => {
                    tracing::warn!(%key, error = %err, "keychain delete failed");
                }
            }
        }
        self.fallback.remove(key).await
    }
}

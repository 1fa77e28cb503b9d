//! Durable client storage.
//!
//! Four keys are persisted, each independently: the cart lines, the access
//! token, the refresh token and the user snapshot. A missing, `"undefined"`
//! or unparseable entry reads as absent. Writes happen in a subscriber task
//! that watches the session and cart stores; store mutations never touch
//! storage themselves.

use std::sync::Arc;

use fusion_types::auth::Identity;
use fusion_types::cart::CartItem;
use fusion_types::error::StorageError;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cart::{Cart, CartStore};
use crate::session::{SessionSnapshot, SessionState, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    CartItems,
    AuthToken,
    RefreshToken,
    AuthUser,
}

impl StorageKey {
    pub const ALL: [StorageKey; 4] = [
        StorageKey::CartItems,
        StorageKey::AuthToken,
        StorageKey::RefreshToken,
        StorageKey::AuthUser,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::CartItems => "cartItems",
            StorageKey::AuthToken => "authToken",
            StorageKey::RefreshToken => "refreshToken",
            StorageKey::AuthUser => "authUser",
        }
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw key/value storage holding JSON text.
pub trait StateStorage: Send + Sync + 'static {
    fn read(
        &self,
        key: StorageKey,
    ) -> impl std::future::Future<Output = Result<Option<String>, StorageError>> + Send;

    fn write(
        &self,
        key: StorageKey,
        value: String,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    fn remove(&self, key: StorageKey) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}

/// Read and parse one key. Every failure mode collapses to `None`.
pub async fn read_json<S: StateStorage, T: DeserializeOwned>(storage: &S, key: StorageKey) -> Option<T> {
    let raw = match storage.read(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(%key, error = %err, "could not read stored value");
            return None;
        }
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "undefined" {
        return None;
    }
    match serde_json::from_str(trimmed) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(%key, error = %err, "ignoring corrupt stored value");
            None
        }
    }
}

/// Values persisted by a previous run.
#[derive(Debug, Default)]
pub struct StoredState {
    pub session: SessionSnapshot,
    pub cart: Vec<CartItem>,
}

pub async fn load_state<S: StateStorage>(storage: &S) -> StoredState {
    StoredState {
        session: SessionSnapshot {
            access_token: read_json(storage, StorageKey::AuthToken).await,
            refresh_token: read_json(storage, StorageKey::RefreshToken).await,
            identity: read_json::<S, Identity>(storage, StorageKey::AuthUser).await,
        },
        cart: read_json(storage, StorageKey::CartItems)
            .await
            .unwrap_or_default(),
    }
}

async fn put<S: StateStorage, T: Serialize + ?Sized>(storage: &S, key: StorageKey, value: Option<&T>) {
    let result = match value {
        Some(value) => match serde_json::to_string(value) {
            Ok(json) => storage.write(key, json).await,
            Err(err) => Err(StorageError::Serialize {
                key: key.to_string(),
                message: err.to_string(),
            }),
        },
        None => storage.remove(key).await,
    };
    if let Err(err) = result {
        tracing::warn!(%key, error = %err, "could not persist value");
    }
}

async fn persist_session<S: StateStorage>(storage: &S, state: SessionState) {
    let access = state.access_token.as_ref().map(|t| t.expose_secret().to_string());
    let refresh = state.refresh_token.as_ref().map(|t| t.expose_secret().to_string());
    put(storage, StorageKey::AuthToken, access.as_ref()).await;
    put(storage, StorageKey::RefreshToken, refresh.as_ref()).await;
    put(storage, StorageKey::AuthUser, state.identity.as_ref()).await;
}

async fn persist_cart<S: StateStorage>(storage: &S, cart: Cart) {
    put(storage, StorageKey::CartItems, Some(cart.items())).await;
}

/// Running persistence subscriber.
pub struct PersisterHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PersisterHandle {
    /// Stop the subscriber after writing the latest state of both stores.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "persistence task failed");
        }
    }
}

/// Spawn the task that writes store changes to `storage`.
///
/// Subscribes at call time: state installed before this call (e.g. by a
/// restore) is not rewritten.
pub fn spawn_persister<S: StateStorage>(
    storage: Arc<S>,
    session: &SessionStore,
    cart: &CartStore,
) -> PersisterHandle {
    let mut session_rx = session.subscribe();
    let mut cart_rx = cart.subscribe();
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                changed = session_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = session_rx.borrow_and_update().clone();
                    persist_session(storage.as_ref(), state).await;
                }
                changed = cart_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = cart_rx.borrow_and_update().clone();
                    persist_cart(storage.as_ref(), snapshot).await;
                }
            }
        }

        // Flush anything published after the last write.
        if session_rx.has_changed().unwrap_or(false) {
            let state = session_rx.borrow_and_update().clone();
            persist_session(storage.as_ref(), state).await;
        }
        if cart_rx.has_changed().unwrap_or(false) {
            let snapshot = cart_rx.borrow_and_update().clone();
            persist_cart(storage.as_ref(), snapshot).await;
        }
        tracing::debug!("persistence task stopped");
    });

    PersisterHandle { cancel, task }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cart::tests::product;
    use crate::session::jwt::tests::token_for;
    use dashmap::DashMap;

    #[derive(Default)]
    pub(crate) struct MemoryStorage {
        pub(crate) entries: DashMap<StorageKey, String>,
    }

    impl StateStorage for MemoryStorage {
        async fn read(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
            Ok(self.entries.get(&key).map(|v| v.value().clone()))
        }

        async fn write(&self, key: StorageKey, value: String) -> Result<(), StorageError> {
            self.entries.insert(key, value);
            Ok(())
        }

        async fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
            self.entries.remove(&key);
            Ok(())
        }
    }

    #[tokio::test]
    async fn unreadable_entries_read_as_absent() {
        let storage = MemoryStorage::default();
        storage.entries.insert(StorageKey::AuthToken, "undefined".to_string());
        storage.entries.insert(StorageKey::CartItems, "{not json".to_string());
        storage
            .entries
            .insert(StorageKey::RefreshToken, "\"r-1\"".to_string());

        let state = load_state(&storage).await;
        assert!(state.session.access_token.is_none());
        assert_eq!(state.session.refresh_token.as_deref(), Some("r-1"));
        assert!(state.session.identity.is_none());
        assert!(state.cart.is_empty());
    }

    #[tokio::test]
    async fn writes_follow_store_changes() {
        let storage = Arc::new(MemoryStorage::default());
        let session = SessionStore::new();
        let cart = CartStore::new();
        let persister = spawn_persister(Arc::clone(&storage), &session, &cart);

        let access = token_for(2, "b@example.com", false);
        session.set_tokens(&access, Some("r-2")).unwrap();
        cart.add(&product(1, "Mug", "19.99"));
        persister.shutdown().await;

        let stored_access: String =
            serde_json::from_str(&storage.entries.get(&StorageKey::AuthToken).unwrap()).unwrap();
        assert_eq!(stored_access, access);
        let user: Identity =
            serde_json::from_str(&storage.entries.get(&StorageKey::AuthUser).unwrap()).unwrap();
        assert_eq!(user.email, "b@example.com");
        let items: Vec<CartItem> =
            serde_json::from_str(&storage.entries.get(&StorageKey::CartItems).unwrap()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price.to_string(), "19.99");
    }

    #[tokio::test]
    async fn logout_removes_session_keys() {
        let storage = Arc::new(MemoryStorage::default());
        let session = SessionStore::new();
        let cart = CartStore::new();
        session
            .set_tokens(&token_for(2, "b@example.com", false), Some("r-2"))
            .unwrap();
        let persister = spawn_persister(Arc::clone(&storage), &session, &cart);
        storage.entries.insert(StorageKey::AuthToken, "\"stale\"".to_string());

        session.clear();
        persister.shutdown().await;

        assert!(!storage.entries.contains_key(&StorageKey::AuthToken));
        assert!(!storage.entries.contains_key(&StorageKey::RefreshToken));
        assert!(!storage.entries.contains_key(&StorageKey::AuthUser));
    }

    #[tokio::test]
    async fn restore_round_trip_through_storage() {
        let storage = Arc::new(MemoryStorage::default());
        {
            let session = SessionStore::new();
            let cart = CartStore::new();
            let persister = spawn_persister(Arc::clone(&storage), &session, &cart);
            session
                .set_tokens(&token_for(7, "c@example.com", true), Some("r-7"))
                .unwrap();
            cart.add(&product(4, "Lamp", "30.00"));
            persister.shutdown().await;
        }

        let state = load_state(storage.as_ref()).await;
        let session = SessionStore::new();
        session.restore(state.session);
        assert!(session.is_admin());
        assert_eq!(session.refresh_token().unwrap().expose_secret(), "r-7");
        assert_eq!(state.cart.len(), 1);
    }
}

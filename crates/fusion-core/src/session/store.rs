use fusion_types::auth::Identity;
use fusion_types::error::SessionError;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;

use super::jwt::decode_identity;

/// Current credentials. All fields are `None` when logged out.
///
/// The three fields mirror the three persisted keys and are restored
/// independently, so a partially persisted session is representable.
#[derive(Default)]
pub struct SessionState {
    pub access_token: Option<SecretString>,
    pub refresh_token: Option<SecretString>,
    pub identity: Option<Identity>,
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        self.access_token.is_some()
    }
}

impl Clone for SessionState {
    fn clone(&self) -> Self {
        Self {
            access_token: self.access_token.as_ref().map(reseal),
            refresh_token: self.refresh_token.as_ref().map(reseal),
            identity: self.identity.clone(),
        }
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("identity", &self.identity)
            .finish()
    }
}

fn reseal(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_string())
}

/// Values read back from durable storage at startup.
#[derive(Debug, Default)]
pub struct SessionSnapshot {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub identity: Option<Identity>,
}

/// Owner of the session. Cheap to share behind an `Arc`.
pub struct SessionStore {
    tx: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionState::default());
        Self { tx }
    }

    /// Install a freshly issued token pair.
    ///
    /// The identity is decoded from the access token. A token that cannot be
    /// decoded is rejected and the existing session is left untouched. When
    /// `refresh` is `None` the current refresh token is kept.
    pub fn set_tokens(&self, access: &str, refresh: Option<&str>) -> Result<Identity, SessionError> {
        let identity = decode_identity(access)?;

        let rotated = refresh.is_some();
        self.tx.send_modify(|state| {
            state.access_token = Some(SecretString::from(access.to_string()));
            if let Some(refresh) = refresh {
                state.refresh_token = Some(SecretString::from(refresh.to_string()));
            }
            state.identity = Some(identity.clone());
        });

        tracing::debug!(
            user_id = %identity.id,
            rotated_refresh = rotated,
            "session tokens updated"
        );
        Ok(identity)
    }

    /// Log out: wipe tokens and identity.
    pub fn clear(&self) {
        self.tx.send_modify(|state| *state = SessionState::default());
        tracing::debug!("session cleared");
    }

    /// Load persisted values at startup.
    ///
    /// Subscribers created after this call do not see it as a change, so the
    /// restored values are not written straight back to storage. A snapshot
    /// with a token but no user record falls back to decoding the token.
    pub fn restore(&self, snapshot: SessionSnapshot) {
        let identity = snapshot.identity.or_else(|| {
            snapshot
                .access_token
                .as_deref()
                .and_then(|token| decode_identity(token).ok())
        });

        self.tx.send_replace(SessionState {
            access_token: snapshot.access_token.map(SecretString::from),
            refresh_token: snapshot.refresh_token.map(SecretString::from),
            identity,
        });
    }

    pub fn is_logged_in(&self) -> bool {
        self.tx.borrow().is_logged_in()
    }

    pub fn is_admin(&self) -> bool {
        self.tx
            .borrow()
            .identity
            .as_ref()
            .is_some_and(|identity| identity.is_privileged)
    }

    pub fn identity(&self) -> Option<Identity> {
        self.tx.borrow().identity.clone()
    }

    pub fn access_token(&self) -> Option<SecretString> {
        self.tx.borrow().access_token.as_ref().map(reseal)
    }

    pub fn refresh_token(&self) -> Option<SecretString> {
        self.tx.borrow().refresh_token.as_ref().map(reseal)
    }

    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Receive every subsequent session change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::jwt::tests::token_for;
    use fusion_types::auth::UserId;

    #[test]
    fn set_tokens_decodes_identity() {
        let store = SessionStore::new();
        let access = token_for(3, "staff@example.com", true);
        store.set_tokens(&access, Some("refresh-1")).unwrap();

        assert!(store.is_logged_in());
        assert!(store.is_admin());
        assert_eq!(store.identity().unwrap().id, UserId(3));
        assert_eq!(store.access_token().unwrap().expose_secret(), access);
        assert_eq!(store.refresh_token().unwrap().expose_secret(), "refresh-1");
    }

    #[test]
    fn set_tokens_keeps_refresh_when_not_rotated() {
        let store = SessionStore::new();
        store
            .set_tokens(&token_for(3, "a@example.com", false), Some("refresh-1"))
            .unwrap();
        store.set_tokens(&token_for(3, "a@example.com", false), None).unwrap();
        assert_eq!(store.refresh_token().unwrap().expose_secret(), "refresh-1");
    }

    #[test]
    fn invalid_token_keeps_prior_session() {
        let store = SessionStore::new();
        let good = token_for(3, "a@example.com", false);
        store.set_tokens(&good, Some("r")).unwrap();

        let err = store.set_tokens("garbage", Some("r2")).unwrap_err();
        assert!(matches!(err, SessionError::InvalidToken(_)));
        assert_eq!(store.access_token().unwrap().expose_secret(), good);
        assert_eq!(store.refresh_token().unwrap().expose_secret(), "r");
    }

    #[test]
    fn clear_wipes_everything() {
        let store = SessionStore::new();
        store
            .set_tokens(&token_for(3, "a@example.com", true), Some("r"))
            .unwrap();
        store.clear();
        assert!(!store.is_logged_in());
        assert!(!store.is_admin());
        assert!(store.identity().is_none());
        assert!(store.refresh_token().is_none());
    }

    #[tokio::test]
    async fn mutations_notify_subscribers() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();
        store
            .set_tokens(&token_for(1, "a@example.com", false), Some("r"))
            .unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_logged_in());

        store.clear();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_logged_in());
    }

    #[test]
    fn restore_decodes_missing_user_from_token() {
        let store = SessionStore::new();
        store.restore(SessionSnapshot {
            access_token: Some(token_for(5, "b@example.com", false)),
            refresh_token: None,
            identity: None,
        });
        assert_eq!(store.identity().unwrap().email, "b@example.com");
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn debug_redacts_tokens() {
        let store = SessionStore::new();
        store
            .set_tokens(&token_for(1, "a@example.com", false), Some("very-secret"))
            .unwrap();
        let printed = format!("{:?}", store.snapshot());
        assert!(!printed.contains("very-secret"));
        assert!(printed.contains("[REDACTED]"));
    }
}

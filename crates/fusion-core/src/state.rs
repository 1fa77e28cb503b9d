//! Client state container: session, cart and conversations together.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::chat::{ConversationStore, LogoutHook};
use crate::persistence::{PersisterHandle, StateStorage, load_state, spawn_persister};
use crate::session::SessionStore;

/// The three stores a running client shares between its components.
#[derive(Clone, Default)]
pub struct ClientState {
    pub session: Arc<SessionStore>,
    pub cart: Arc<CartStore>,
    pub conversations: Arc<ConversationStore>,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore persisted state from `storage` and start writing changes back.
    pub async fn restore<S: StateStorage>(storage: Arc<S>) -> (Self, PersisterHandle) {
        let state = Self::new();
        let stored = load_state(storage.as_ref()).await;
        state.session.restore(stored.session);
        state.cart.restore(stored.cart);
        tracing::debug!(
            logged_in = state.session.is_logged_in(),
            cart_lines = state.cart.items().len(),
            "restored client state"
        );

        let persister = spawn_persister(storage, &state.session, &state.cart);
        (state, persister)
    }

    /// Clear the session, the cart and every conversation.
    pub fn logout(&self) {
        self.session.clear();
        self.cart.clear();
        self.conversations.clear_all();
        tracing::info!("logged out");
    }
}

impl LogoutHook for ClientState {
    fn force_logout(&self) {
        self.logout();
    }
}

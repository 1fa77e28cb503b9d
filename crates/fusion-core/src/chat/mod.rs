//! Live chat: conversation store, socket ports and the per-surface driver.

pub mod client;
pub mod conversation;
pub mod reconnect;
pub mod socket;

pub use client::{ChatClient, ChatEvent, ChatHandle, ChatOptions, LogoutHook};
pub use conversation::ConversationStore;
pub use reconnect::ReconnectPolicy;
pub use socket::{ChatSocket, SocketConnector};

use fusion_types::auth::UserId;
use fusion_types::chat::Counterpart;
use fusion_types::error::ApiError;

use crate::api::{ApiClient, HttpTransport};

/// Load an admin conversation's history into the store before opening its
/// socket. Returns the number of messages loaded.
pub async fn load_admin_history<T: HttpTransport>(
    api: &ApiClient<T>,
    conversations: &ConversationStore,
    customer_id: UserId,
) -> Result<usize, ApiError> {
    let page = api.chat_history(customer_id).await?;
    let loaded = page.results.len();
    conversations.replace(Counterpart::Customer(customer_id), page.results);
    tracing::debug!(%customer_id, loaded, "loaded chat history");
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::{FakeTransport, logged_in_session};
    use crate::session::jwt::tests::token_for;
    use fusion_types::chat::{ChatMessage, MessageId};

    const HISTORY: &str = r#"{"count":2,"next":null,"previous":null,"results":[
        {"id":10,"user":"shopper@example.com","message":"Where is my order?","timestamp":"2026-10-01T09:00:00Z"},
        {"id":11,"user":"admin@example.com","message":"Checking now.","timestamp":"2026-10-01T09:01:00Z"}
    ]}"#;

    #[tokio::test]
    async fn history_replaces_then_live_frames_append_once() {
        let access = token_for(1, "admin@example.com", true);
        let api = ApiClient::new(FakeTransport::with(vec![(200, HISTORY)]), logged_in_session(&access));
        let conversations = ConversationStore::new();
        let customer = UserId(42);
        let counterpart = Counterpart::Customer(customer);
        conversations.append(
            counterpart,
            serde_json::from_str::<ChatMessage>(
                r#"{"id":3,"user":"stale@example.com","message":"old","timestamp":"2026-09-01T00:00:00Z"}"#,
            )
            .unwrap(),
        );

        let loaded = load_admin_history(&api, &conversations, customer).await.unwrap();
        assert_eq!(loaded, 2);
        assert_eq!(api.transport().calls()[0].0.path, "/chat/history/42/");

        let ids: Vec<MessageId> = conversations.messages(counterpart).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![MessageId::Server(10), MessageId::Server(11)]);

        // The socket replays the last history entry, then sends a new one.
        let replayed = conversations.messages(counterpart)[1].clone();
        assert!(!conversations.append(counterpart, replayed));
        let live: ChatMessage = serde_json::from_str(
            r#"{"id":12,"user":"shopper@example.com","message":"Thanks!","timestamp":"2026-10-01T09:02:00Z"}"#,
        )
        .unwrap();
        assert!(conversations.append(counterpart, live));
        assert_eq!(conversations.len(counterpart), 3);
    }

    #[tokio::test]
    async fn failed_history_leaves_conversation_untouched() {
        let access = token_for(1, "admin@example.com", true);
        let api = ApiClient::new(
            FakeTransport::with(vec![(403, r#"{"detail":"Forbidden"}"#)]),
            logged_in_session(&access),
        );
        let conversations = ConversationStore::new();

        let err = load_admin_history(&api, &conversations, UserId(42)).await.unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert!(!conversations.contains(Counterpart::Customer(UserId(42))));
    }
}

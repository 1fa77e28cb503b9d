//! Per-counterpart message lists.
//!
//! Messages keep arrival order; nothing here re-sorts. Appends are
//! idempotent on message id so history replay and live frames can overlap.

use dashmap::DashMap;
use fusion_types::chat::{ChatMessage, Counterpart, MessageId};

#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: DashMap<Counterpart, Vec<ChatMessage>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole conversation (history load).
    pub fn replace(&self, counterpart: Counterpart, messages: Vec<ChatMessage>) {
        let mut deduped: Vec<ChatMessage> = Vec::with_capacity(messages.len());
        for message in messages {
            if !deduped.iter().any(|m| m.id == message.id) {
                deduped.push(message);
            }
        }
        self.conversations.insert(counterpart, deduped);
    }

    /// Drop the conversation entry entirely.
    pub fn clear(&self, counterpart: Counterpart) {
        self.conversations.remove(&counterpart);
    }

    pub fn clear_all(&self) {
        self.conversations.clear();
    }

    /// Append `message` unless a message with the same id is already present.
    /// Returns whether it was appended.
    pub fn append(&self, counterpart: Counterpart, message: ChatMessage) -> bool {
        let mut entry = self.conversations.entry(counterpart).or_default();
        if entry.iter().any(|m| m.id == message.id) {
            tracing::trace!(%counterpart, id = %message.id, "duplicate message ignored");
            return false;
        }
        entry.push(message);
        true
    }

    pub fn messages(&self, counterpart: Counterpart) -> Vec<ChatMessage> {
        self.conversations
            .get(&counterpart)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn len(&self, counterpart: Counterpart) -> usize {
        self.conversations
            .get(&counterpart)
            .map_or(0, |entry| entry.len())
    }

    pub fn is_empty(&self, counterpart: Counterpart) -> bool {
        self.len(counterpart) == 0
    }

    pub fn contains(&self, counterpart: Counterpart) -> bool {
        self.conversations.contains_key(&counterpart)
    }

    /// Oldest optimistic echo by `author` with body `body`, if any.
    pub fn pending_echo(&self, counterpart: Counterpart, author: &str, body: &str) -> Option<MessageId> {
        self.conversations.get(&counterpart).and_then(|entry| {
            entry
                .iter()
                .find(|m| m.id.is_local() && m.user == author && m.message == body)
                .map(|m| m.id.clone())
        })
    }

    /// Swap the local echo `local_id` for the server's copy, in place.
    ///
    /// If the server copy is already present the echo is simply dropped.
    /// Returns `false` when no message with `local_id` exists.
    pub fn reconcile(&self, counterpart: Counterpart, local_id: &MessageId, message: ChatMessage) -> bool {
        let Some(mut entry) = self.conversations.get_mut(&counterpart) else {
            return false;
        };
        let Some(idx) = entry.iter().position(|m| &m.id == local_id) else {
            return false;
        };
        if entry.iter().any(|m| m.id == message.id) {
            entry.remove(idx);
        } else {
            entry[idx] = message;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fusion_types::auth::UserId;

    fn msg(id: i64, user: &str, text: &str) -> ChatMessage {
        ChatMessage {
            id: MessageId::Server(id),
            user: user.to_string(),
            message: text.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn append_is_idempotent_on_id() {
        let store = ConversationStore::new();
        let c = Counterpart::Support;
        assert!(store.append(c, msg(1, "FusionBot", "hello")));
        assert!(!store.append(c, msg(1, "FusionBot", "hello again")));
        assert_eq!(store.len(c), 1);
        assert_eq!(store.messages(c)[0].message, "hello");
    }

    #[test]
    fn conversations_are_independent() {
        let store = ConversationStore::new();
        let alice = Counterpart::Customer(UserId(1));
        let bob = Counterpart::Customer(UserId(2));
        store.append(alice, msg(1, "a", "x"));
        store.append(bob, msg(1, "b", "y"));
        assert_eq!(store.len(alice), 1);
        assert_eq!(store.len(bob), 1);

        store.clear(alice);
        assert!(!store.contains(alice));
        assert!(store.contains(bob));

        store.clear_all();
        assert!(!store.contains(bob));
    }

    #[test]
    fn replace_then_append_keeps_order() {
        let store = ConversationStore::new();
        let c = Counterpart::Support;
        store.replace(c, vec![msg(1, "a", "1"), msg(2, "b", "2"), msg(1, "a", "dup")]);
        store.append(c, msg(3, "a", "3"));
        store.append(c, msg(2, "b", "2"));
        let ids: Vec<MessageId> = store.messages(c).into_iter().map(|m| m.id).collect();
        assert_eq!(
            ids,
            vec![MessageId::Server(1), MessageId::Server(2), MessageId::Server(3)]
        );
    }

    #[test]
    fn reconcile_replaces_oldest_matching_echo() {
        let store = ConversationStore::new();
        let c = Counterpart::Support;
        let first = ChatMessage::local("me@example.com", "hi");
        let second = ChatMessage::local("me@example.com", "hi");
        store.append(c, first.clone());
        store.append(c, msg(10, "FusionBot", "hello"));
        store.append(c, second.clone());

        let pending = store.pending_echo(c, "me@example.com", "hi").unwrap();
        assert_eq!(pending, first.id);

        assert!(store.reconcile(c, &pending, msg(11, "me@example.com", "hi")));
        let messages = store.messages(c);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].id, MessageId::Server(11));
        assert_eq!(messages[2].id, second.id);
    }

    #[test]
    fn reconcile_drops_echo_when_server_copy_exists() {
        let store = ConversationStore::new();
        let c = Counterpart::Support;
        let echo = ChatMessage::local("me@example.com", "hi");
        store.append(c, echo.clone());
        store.append(c, msg(11, "me@example.com", "hi"));

        assert!(store.reconcile(c, &echo.id, msg(11, "me@example.com", "hi")));
        assert_eq!(store.len(c), 1);
        assert!(!store.reconcile(c, &echo.id, msg(11, "me@example.com", "hi")));
    }
}

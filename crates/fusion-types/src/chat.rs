//! Chat message, counterpart and connection-state types.
//!
//! Inbound frames and history entries share one shape:
//! `{id, user, message, timestamp}`. Outbound frames are `{message}`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::UserId;

/// Prefix of ids assigned to optimistic local echoes.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// A chat message id.
///
/// Persisted messages carry the server's integer key; error frames use a
/// string id (`error-<timestamp>`), and optimistic echoes use `local-<uuid>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    Server(i64),
    Text(String),
}

impl MessageId {
    /// Fresh id for a locally authored message.
    pub fn local() -> Self {
        MessageId::Text(format!("{LOCAL_ID_PREFIX}{}", Uuid::now_v7()))
    }

    pub fn is_local(&self) -> bool {
        matches!(self, MessageId::Text(s) if s.starts_with(LOCAL_ID_PREFIX))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Server(id) => write!(f, "{id}"),
            MessageId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    /// Author display string (an email, `FusionBot`, or `System`).
    pub user: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Optimistic echo for text the current user just sent.
    pub fn local(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::local(),
            user: author.into(),
            message: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Outbound socket frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutgoingChat {
    pub message: String,
}

/// Whose conversation a message belongs to.
///
/// A customer has a single conversation with support; an admin has one per
/// customer they open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counterpart {
    Support,
    Customer(UserId),
}

impl fmt::Display for Counterpart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Counterpart::Support => f.write_str("support"),
            Counterpart::Customer(id) => write!(f, "customer:{id}"),
        }
    }
}

/// Which chat UI a socket is serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatSurface {
    /// Customer support widget.
    Support,
    /// Admin conversation with one customer.
    Admin { customer_id: UserId },
}

impl ChatSurface {
    pub fn counterpart(&self) -> Counterpart {
        match self {
            ChatSurface::Support => Counterpart::Support,
            ChatSurface::Admin { customer_id } => Counterpart::Customer(*customer_id),
        }
    }

    /// Socket path relative to the ws base url, including the trailing slash.
    pub fn socket_path(&self) -> String {
        match self {
            ChatSurface::Support => "/ws/chat/".to_string(),
            ChatSurface::Admin { customer_id } => format!("/ws/chat/{customer_id}/"),
        }
    }

    /// Support shows the sender's message immediately; admin waits for the server.
    pub fn echoes_locally(&self) -> bool {
        matches!(self, ChatSurface::Support)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Closed,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "Connecting...",
            ConnectionState::Open => "Connected",
            ConnectionState::Closing => "Closing...",
            ConnectionState::Closed => "Disconnected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

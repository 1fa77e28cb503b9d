//! Session store: access token, refresh token and the decoded identity.
//!
//! The session is the single owner of credentials. Every mutation goes through
//! [`SessionStore`], which publishes the new snapshot on a `watch` channel so
//! that persistence and the chat driver observe changes without being called
//! from inside the mutation.

pub mod jwt;
pub mod store;

pub use store::{SessionSnapshot, SessionState, SessionStore};

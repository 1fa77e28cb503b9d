//! Shared domain types for the Fusion storefront client.
//!
//! This crate contains the wire and domain types used across the client:
//! identity and tokens, catalog, cart, orders, chat messages, configuration,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod document;
pub mod error;
pub mod inventory;
pub mod money;
pub mod order;
pub mod page;
pub mod upload;

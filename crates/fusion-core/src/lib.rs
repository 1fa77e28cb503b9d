//! Client-side state and protocol logic for the Fusion storefront.
//!
//! This crate owns the stores (session, cart, conversations), the request
//! layer with re-authentication, the chat socket driver and the checkout flow.
//! I/O is reached only through the port traits defined here
//! ([`api::HttpTransport`], [`chat::SocketConnector`],
//! [`persistence::StateStorage`], [`payment::PaymentProcessor`]); the
//! implementations live in `fusion-infra`.

pub mod api;
pub mod cart;
pub mod chat;
pub mod inventory;
pub mod pagination;
pub mod payment;
pub mod persistence;
pub mod session;
pub mod state;

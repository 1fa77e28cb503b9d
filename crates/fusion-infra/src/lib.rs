//! Infrastructure implementations for Fusion.
//!
//! Concrete adapters for the ports defined in `fusion-core`: the reqwest
//! transport, the tokio-tungstenite chat socket, JSON file storage with OS
//! keychain routing for tokens, and the payment processor client, plus
//! config loading.

pub mod config;
pub mod http;
pub mod keychain;
pub mod payment;
pub mod socket;
pub mod storage;

//! Observability for the Fusion client.

pub mod tracing_setup;

//! REST request layer.
//!
//! - `transport`: the [`HttpTransport`] port and plain-data requests.
//! - `client`: [`ApiClient`], bearer attachment and 401 re-authentication.
//! - `endpoints`: typed methods for each backend endpoint.

pub mod client;
pub mod endpoints;
pub mod transport;

pub use client::{ApiClient, extract_message};
pub use transport::{ApiRequest, ApiResponse, FormPart, FormValue, HttpTransport, Method, RequestBody};

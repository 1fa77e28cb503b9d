use thiserror::Error;

/// Failure of a REST request, as seen by callers of the request layer.
///
/// This is the structured half of the tagged API result: a call either yields
/// its decoded payload or one of these variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("request failed"))]
    Status {
        status: u16,
        /// Human-readable message extracted from the structured error body.
        message: Option<String>,
        /// Raw response body, kept so callers see the response unmodified.
        body: String,
    },

    /// The request never produced a response (connection refused, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// A success response whose body did not match the expected shape.
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status for `Status` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Message suitable for an inline form error, falling back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Errors related to the session store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("access token is malformed: {0}")]
    InvalidToken(String),
}

/// Errors raised by the chat socket client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("chat connection is not open")]
    NotConnected,

    #[error("not logged in")]
    NotLoggedIn,

    #[error("socket connect failed: {0}")]
    Connect(String),

    #[error("socket error: {0}")]
    Socket(String),
}

/// Errors from the checkout flow.
///
/// The two rejection sources are kept apart for logging but render as one
/// user-visible message via [`PaymentError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("cart is empty")]
    EmptyCart,

    /// The backend refused to create a payment handle.
    #[error("server rejected payment: {0}")]
    Server(String),

    /// The payment processor refused the confirmation (e.g. card declined).
    #[error("payment processor rejected payment: {0}")]
    Processor(String),

    #[error("payment processor is not configured")]
    NotConfigured,
}

impl PaymentError {
    pub fn user_message(&self) -> String {
        match self {
            PaymentError::EmptyCart => "Your cart is empty.".to_string(),
            PaymentError::Server(msg) | PaymentError::Processor(msg) => msg.clone(),
            PaymentError::NotConfigured => {
                "Payments are not configured for this client.".to_string()
            }
        }
    }
}

/// Errors from durable client storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("could not serialize value for '{key}': {message}")]
    Serialize { key: String, message: String },
}

/// Errors parsing decimal price strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("empty price")]
    Empty,

    #[error("invalid price '{0}'")]
    Invalid(String),

    #[error("price '{0}' has more than two decimal places")]
    TooPrecise(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_with_message() {
        let err = ApiError::Status {
            status: 400,
            message: Some("Cart is empty".to_string()),
            body: "{\"error\":\"Cart is empty\"}".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 400: Cart is empty");
    }

    #[test]
    fn test_api_error_display_without_message() {
        let err = ApiError::Status {
            status: 500,
            message: None,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "HTTP 500: request failed");
    }

    #[test]
    fn test_api_error_user_message_fallback() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.user_message("Could not process payment."), "Could not process payment.");
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_payment_error_single_message() {
        let server = PaymentError::Server("Not enough stock for Mug".to_string());
        let processor = PaymentError::Processor("Your card was declined.".to_string());
        assert_eq!(server.user_message(), "Not enough stock for Mug");
        assert_eq!(processor.user_message(), "Your card was declined.");
    }
}

//! Socket port traits.
//!
//! A successful [`SocketConnector::connect`] is the "open" event; a failed one
//! is a close that happened before the socket ever opened. Implementations
//! live in fusion-infra.

use fusion_types::error::ChatError;

/// Opens chat sockets.
pub trait SocketConnector: Send + Sync + 'static {
    type Socket: ChatSocket;

    /// Connect to `url` (token already in the query string).
    fn connect(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<Self::Socket, ChatError>> + Send;
}

/// One open chat socket carrying JSON text frames.
pub trait ChatSocket: Send + 'static {
    /// Transmit one text frame.
    fn send_text(
        &mut self,
        text: String,
    ) -> impl std::future::Future<Output = Result<(), ChatError>> + Send;

    /// Next inbound text frame. `None` means the peer closed the socket.
    ///
    /// Must be cancel-safe: the driver races it against other events.
    fn next_frame(
        &mut self,
    ) -> impl std::future::Future<Output = Option<Result<String, ChatError>>> + Send;

    /// Close the socket. Errors are not reported; the socket is gone either way.
    fn close(&mut self) -> impl std::future::Future<Output = ()> + Send;
}

//! tokio-tungstenite chat socket.
//!
//! A rejected handshake (the server refusing the token) surfaces as
//! [`ChatError::Connect`] from [`SocketConnector::connect`], which the chat
//! driver treats as an authentication failure.

use fusion_core::chat::{ChatSocket, SocketConnector};
use fusion_types::error::ChatError;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self
    }
}

fn connect_error(err: tungstenite::Error) -> ChatError {
    match err {
        tungstenite::Error::Http(response) => {
            ChatError::Connect(format!("handshake rejected with HTTP {}", response.status()))
        }
        other => ChatError::Connect(other.to_string()),
    }
}

impl SocketConnector for TungsteniteConnector {
    type Socket = TungsteniteSocket;

    async fn connect(&self, url: &str) -> Result<TungsteniteSocket, ChatError> {
        let (stream, response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(connect_error)?;
        tracing::debug!(status = response.status().as_u16(), "chat socket handshake complete");
        Ok(TungsteniteSocket { stream })
    }
}

pub struct TungsteniteSocket {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl ChatSocket for TungsteniteSocket {
    async fn send_text(&mut self, text: String) -> Result<(), ChatError> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| ChatError::Socket(e.to_string()))
    }

    async fn next_frame(&mut self) -> Option<Result<String, ChatError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => tracing::debug!("ignoring non-UTF-8 binary frame"),
                },
                Ok(Message::Close(frame)) => {
                    tracing::debug!(?frame, "chat socket closed by peer");
                    return None;
                }
                // Ping/pong are answered by tungstenite itself.
                Ok(_) => {}
                Err(tungstenite::Error::ConnectionClosed) => return None,
                Err(e) => return Some(Err(ChatError::Socket(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            tracing::debug!(error = %e, "chat socket close failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn exchanges_text_frames() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(Message::Text(r#"{"id":1,"user":"FusionBot","message":"Hello","timestamp":"2024-05-01T10:00:00Z"}"#.to_string()))
                .await
                .unwrap();
            let reply = ws.next().await.unwrap().unwrap();
            ws.close(None).await.unwrap();
            reply.into_text().unwrap()
        });

        let connector = TungsteniteConnector::new();
        let mut socket = connector
            .connect(&format!("ws://{addr}/ws/chat/?token=abc"))
            .await
            .unwrap();

        let frame = socket.next_frame().await.unwrap().unwrap();
        assert!(frame.contains("FusionBot"));

        socket
            .send_text(r#"{"message":"hi"}"#.to_string())
            .await
            .unwrap();
        assert!(socket.next_frame().await.is_none());
        assert_eq!(server.await.unwrap(), r#"{"message":"hi"}"#);
    }

    #[tokio::test]
    async fn rejected_handshake_is_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = stream.read(&mut buf).await;
            stream
                .write_all(b"HTTP/1.1 403 Forbidden\r\ncontent-length: 0\r\n\r\n")
                .await
                .unwrap();
        });

        let err = TungsteniteConnector::new()
            .connect(&format!("ws://{addr}/ws/chat/?token=expired"))
            .await
            .err()
            .unwrap();
        match err {
            ChatError::Connect(message) => assert!(message.contains("403"), "{message}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

use async_trait::async_trait;
use drishya_logging::drishya_trace;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::TransportError;

/// Opens connections to the live update endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self) -> Result<Box<dyn TransportConnection>, TransportError>;
}

/// One open connection, yielding text payloads in arrival order.
#[async_trait]
pub trait TransportConnection: Send {
    /// Next text payload. `Ok(None)` means the peer closed the connection.
    async fn next_text(&mut self) -> Result<Option<String>, TransportError>;

    async fn close(&mut self);
}

#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    url: String,
}

impl WebSocketTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn open(&self) -> Result<Box<dyn TransportConnection>, TransportError> {
        let (stream, _response) = connect_async(self.url.as_str())
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?;
        Ok(Box::new(WebSocketConnection { stream }))
    }
}

struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl TransportConnection for WebSocketConnection {
    async fn next_text(&mut self) -> Result<Option<String>, TransportError> {
        while let Some(frame) = self.stream.next().await {
            match frame.map_err(|err| TransportError::Receive(err.to_string()))? {
                Message::Text(text) => return Ok(Some(text)),
                Message::Close(frame) => {
                    drishya_trace!("Live connection closed by peer: {:?}", frame);
                    return Ok(None);
                }
                // tungstenite answers pings itself while the stream is polled.
                Message::Ping(_) | Message::Pong(_) | Message::Binary(_) | Message::Frame(_) => {}
            }
        }
        Ok(None)
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}

// src/transport/websocket.rs

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, trace};

use crate::errors::{BisectError, Result};
use crate::transport::{Transport, TransportFuture};

/// WebSocket connection to the oracle server.
pub struct WebSocketTransport {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    closed: bool,
}

impl WebSocketTransport {
    /// Connect to `url`, giving up after `timeout`.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        let (ws, _response) = tokio::time::timeout(timeout, connect_async(url))
            .await
            .map_err(|_| BisectError::Transport(format!("connect to {url} timed out")))?
            .map_err(|e| BisectError::Transport(format!("connect to {url} failed: {e}")))?;

        info!(url, "connected to oracle");
        Ok(Self { ws, closed: false })
    }
}

impl Transport for WebSocketTransport {
    fn send(&mut self, frame: String) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            trace!(frame = %frame, "sending frame");
            self.ws
                .send(Message::Text(frame))
                .await
                .map_err(|e| BisectError::Transport(e.to_string()))
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<String>> {
        Box::pin(async move {
            while let Some(msg) = self.ws.next().await {
                let msg = msg.map_err(|e| BisectError::Transport(e.to_string()))?;
                match msg {
                    Message::Text(text) => return Ok(Some(text)),
                    Message::Close(frame) => {
                        debug!(?frame, "oracle closed the connection");
                        self.closed = true;
                        return Ok(None);
                    }
                    // Ping/pong are answered by tungstenite itself.
                    other => trace!(?other, "ignoring non-text frame"),
                }
            }
            Ok(None)
        })
    }

    fn close(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if self.closed {
                return Ok(());
            }
            self.closed = true;
            self.ws
                .close(None)
                .await
                .map_err(|e| BisectError::Transport(e.to_string()))
        })
    }
}

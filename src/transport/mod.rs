// src/transport/mod.rs

//! Message transport abstraction.
//!
//! The runtime talks to a `Transport` instead of a concrete socket, so tests
//! and the local harness can swap in an in-process oracle.
//!
//! - [`websocket`] is the production transport (`tokio-tungstenite`).
//! - [`local`] simulates an oracle that knows the culprit node.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;

pub mod local;
pub mod websocket;

pub use local::{LocalReport, LocalTransport, SimulatedOracle};
pub use websocket::WebSocketTransport;

/// Boxed future returned by [`Transport`] methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Bidirectional channel of text frames to and from the oracle.
pub trait Transport: Send {
    /// Send one frame.
    fn send(&mut self, frame: String) -> TransportFuture<'_, ()>;

    /// Receive the next text frame, or `None` once the peer has closed.
    fn recv(&mut self) -> TransportFuture<'_, Option<String>>;

    /// Close the channel. Closing twice is not an error.
    fn close(&mut self) -> TransportFuture<'_, ()>;
}

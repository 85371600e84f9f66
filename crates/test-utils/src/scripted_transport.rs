use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use dagbisect::transport::{Transport, TransportFuture};

/// A fake transport that:
/// - hands out a fixed list of inbound frames, then reports end of stream
///   (or waits forever, see [`ScriptedTransport::hold_open`])
/// - records every frame the runtime sends
/// - records whether `close` was called.
pub struct ScriptedTransport {
    inbound: VecDeque<String>,
    hold_open: bool,
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<Mutex<bool>>,
}

impl ScriptedTransport {
    pub fn new<I, S>(inbound: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inbound: inbound.into_iter().map(Into::into).collect(),
            hold_open: false,
            sent: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(Mutex::new(false)),
        }
    }

    /// Build from JSON values, one per inbound frame.
    pub fn from_json(inbound: Vec<serde_json::Value>) -> Self {
        Self::new(inbound.into_iter().map(|v| v.to_string()))
    }

    /// Keep the connection open after the last frame instead of ending the
    /// stream, like an oracle that never answers.
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub fn sent(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.sent)
    }

    pub fn closed(&self) -> Arc<Mutex<bool>> {
        Arc::clone(&self.closed)
    }
}

impl Transport for ScriptedTransport {
    fn send(&mut self, frame: String) -> TransportFuture<'_, ()> {
        let sent = Arc::clone(&self.sent);
        Box::pin(async move {
            sent.lock().unwrap().push(frame);
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<String>> {
        let next = self.inbound.pop_front();
        let hold_open = self.hold_open;
        Box::pin(async move {
            if next.is_none() && hold_open {
                std::future::pending::<()>().await;
            }
            Ok(next)
        })
    }

    fn close(&mut self) -> TransportFuture<'_, ()> {
        let closed = Arc::clone(&self.closed);
        Box::pin(async move {
            *closed.lock().unwrap() = true;
            Ok(())
        })
    }
}

// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::engine::core::{CoreSession, SessionStats};
use crate::engine::event_handlers::SessionCommand;
use crate::errors::Result;
use crate::protocol::{ClientMessage, Credentials, decode_server, encode_client};
use crate::transport::Transport;

/// Drives a [`CoreSession`] from frames received over a [`Transport`].
///
/// This is a pure IO shell: all protocol semantics live in the core. Any
/// error (protocol violation, malformed graph, transport failure) closes the
/// transport and ends the run.
pub struct Runtime<T: Transport> {
    core: CoreSession,
    transport: T,
    credentials: Credentials,
    shutdown: Option<mpsc::Receiver<()>>,
}

impl<T: Transport> fmt::Debug for Runtime<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("user", &self.credentials.user())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Runtime<T> {
    pub fn new(core: CoreSession, transport: T, credentials: Credentials) -> Self {
        Self {
            core,
            transport,
            credentials,
            shutdown: None,
        }
    }

    /// Stop the session, with a normal close, once a message arrives on
    /// `shutdown`. A dropped sender is ignored.
    pub fn with_shutdown(mut self, shutdown: mpsc::Receiver<()>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Main loop.
    ///
    /// - Announces the credentials.
    /// - Receives frames and feeds the decoded events into the core.
    /// - Sends whatever the core asks for.
    ///
    /// Returns the session statistics once the oracle sends its score, closes
    /// the connection, or a shutdown is requested.
    pub async fn run(mut self) -> Result<SessionStats> {
        info!(user = %self.credentials.user(), "bisection session started");

        let result = self.serve().await;

        if let Err(e) = &result {
            error!(error = %e, "session aborted");
        }
        if let Err(e) = self.transport.close().await {
            debug!(error = %e, "error while closing transport");
        }

        result?;
        info!(
            instances = self.core.stats().instances_solved(),
            questions = self.core.stats().total_questions(),
            "session finished"
        );
        Ok(self.core.stats().clone())
    }

    async fn serve(&mut self) -> Result<()> {
        let hello = ClientMessage::User(self.credentials.clone());
        self.transport.send(encode_client(&hello)?).await?;

        loop {
            let received = match self.shutdown.as_mut() {
                Some(shutdown) => tokio::select! {
                    frame = self.transport.recv() => frame?,
                    Some(()) = shutdown.recv() => {
                        info!("shutdown requested; leaving session");
                        return Ok(());
                    }
                },
                None => self.transport.recv().await?,
            };
            let frame = match received {
                Some(frame) => frame,
                None => {
                    info!("oracle closed the connection");
                    return Ok(());
                }
            };

            let message = decode_server(&frame)?;
            for event in message.into_events() {
                debug!(kind = event.kind(), state = %self.core.state(), "session received event");

                let step = self.core.step(event)?;
                for command in step.commands {
                    self.execute_command(command).await?;
                }

                if !step.keep_running {
                    info!("core requested exit; stopping runtime");
                    return Ok(());
                }
            }
        }
    }

    async fn execute_command(&mut self, command: SessionCommand) -> Result<()> {
        match ClientMessage::from_command(&command) {
            Some(message) => self.transport.send(encode_client(&message)?).await,
            // Closing happens once the loop exits.
            None => Ok(()),
        }
    }
}

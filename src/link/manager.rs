//! Link lifecycle manager
//!
//! A single worker task per link owns the endpoint handle and the lifecycle
//! state. The public facade only enqueues commands, so connect, send, and
//! close execute strictly one at a time in submission order and never on the
//! caller's context.

use crate::error::LinkError;
use crate::link::state::{is_valid_transition, LinkState};
use crate::sensor::AccelReading;
use crate::status::StatusSink;
use crate::transport::adapter::TargetDescriptor;
use crate::transport::traits::{Connector, Endpoint};
use bytes::Bytes;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tracing::{debug, error, info};

/// Configuration for a link
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Upper bound on the handshake duration
    pub connect_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Lifecycle operations accepted by the link worker
enum LinkCommand {
    Connect(TargetDescriptor),
    Send(Bytes),
    Close,
}

/// Facade over one logical link to a remote peer.
///
/// All operations return immediately; the work happens on a background
/// worker. Failures are reported once to the injected [`StatusSink`], and
/// state changes can be observed through [`SensorLink::state_changes`].
#[derive(Clone)]
pub struct SensorLink {
    commands: mpsc::UnboundedSender<LinkCommand>,
    state_rx: watch::Receiver<LinkState>,
}

impl SensorLink {
    /// Create a link and spawn its worker task
    pub fn new(connector: Box<dyn Connector>, sink: Arc<dyn StatusSink>, config: LinkConfig) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(LinkState::Idle);

        let worker = LinkWorker {
            connector,
            sink,
            config,
            state_tx,
            endpoint: None,
        };
        tokio::spawn(link_loop(worker, command_rx));

        Self { commands, state_rx }
    }

    /// Start connecting to the target. Ignored unless the link is Idle or
    /// Closed.
    pub fn connect(&self, target: TargetDescriptor) {
        let _ = self.commands.send(LinkCommand::Connect(target));
    }

    /// Queue a message for delivery. Silently dropped while the link is not
    /// connected.
    pub fn send(&self, message: impl Into<Bytes>) {
        let _ = self.commands.send(LinkCommand::Send(message.into()));
    }

    /// Tear the link down. Closing an already-closed or never-opened link is
    /// a successful no-op.
    pub fn close(&self) {
        let _ = self.commands.send(LinkCommand::Close);
    }

    /// Forward one accelerometer sample as a wire message
    pub fn on_sample(&self, reading: &AccelReading) {
        self.send(reading.to_wire());
    }

    /// Current lifecycle state
    pub fn state(&self) -> LinkState {
        *self.state_rx.borrow()
    }

    /// Subscribe to lifecycle state changes
    pub fn state_changes(&self) -> watch::Receiver<LinkState> {
        self.state_rx.clone()
    }
}

/// Owns the endpoint handle and the lifecycle state for one link
struct LinkWorker {
    connector: Box<dyn Connector>,
    sink: Arc<dyn StatusSink>,
    config: LinkConfig,
    state_tx: watch::Sender<LinkState>,
    endpoint: Option<Box<dyn Endpoint>>,
}

/// Worker loop: one command at a time, in submission order
async fn link_loop(mut worker: LinkWorker, mut commands: mpsc::UnboundedReceiver<LinkCommand>) {
    while let Some(command) = commands.recv().await {
        let result = match command {
            LinkCommand::Connect(target) => worker.handle_connect(target).await,
            LinkCommand::Send(message) => worker.handle_send(message).await,
            LinkCommand::Close => worker.handle_close().await,
        };
        if let Err(err) = result {
            worker.report(err);
        }
    }

    // Owner went away; release anything still open.
    if worker.endpoint.is_some() {
        let _ = worker.release_endpoint().await;
    }
}

impl LinkWorker {
    fn state(&self) -> LinkState {
        *self.state_tx.borrow()
    }

    fn set_state(&mut self, next: LinkState) {
        let prev = self.state();
        if prev == next {
            return;
        }
        debug_assert!(
            is_valid_transition(prev, next),
            "illegal link transition {prev:?} -> {next:?}"
        );
        self.state_tx.send_replace(next);
        debug!(?prev, ?next, "link state changed");
    }

    /// Report a failure to the status sink, exactly once
    fn report(&self, err: LinkError) {
        error!("{}", err);
        self.sink.error(&err.to_string());
    }

    async fn handle_connect(&mut self, target: TargetDescriptor) -> Result<(), LinkError> {
        let state = self.state();
        if !state.can_connect() {
            debug!(?state, "connect ignored");
            return Ok(());
        }

        self.sink.show_wait("Connecting to Bluetooth device.");
        self.set_state(LinkState::Connecting);

        match self.connector.open(&target).await {
            Ok(endpoint) => self.endpoint = Some(endpoint),
            Err(e) => {
                // Nothing was opened; no resources to release.
                self.set_state(LinkState::Closed);
                return Err(LinkError::Connect {
                    target: target.to_string(),
                    cause: e.to_string(),
                });
            }
        }

        let handshake = match self.endpoint.as_mut() {
            Some(endpoint) => match timeout(self.config.connect_timeout, endpoint.connect()).await {
                Ok(result) => result,
                Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "connect timed out")),
            },
            None => return Ok(()),
        };

        match handshake {
            Ok(()) => {
                self.set_state(LinkState::Connected);
                self.sink.hide_wait();
                info!("link to {} established via {}", target, self.connector.name());
                Ok(())
            }
            Err(e) => {
                // Release whatever the failed handshake left open.
                let _ = self.release_endpoint().await;
                Err(LinkError::Connect {
                    target: target.to_string(),
                    cause: e.to_string(),
                })
            }
        }
    }

    async fn handle_send(&mut self, message: Bytes) -> Result<(), LinkError> {
        if !self.state().can_send() {
            debug!("link not ready, dropping {} byte message", message.len());
            return Ok(());
        }

        let written = match self.endpoint.as_mut() {
            Some(endpoint) => endpoint.send(&message).await,
            None => return Ok(()),
        };

        match written {
            Ok(()) => Ok(()),
            Err(e) => {
                // A failed write leaves the stream unusable; do not keep the
                // link half-open.
                let _ = self.release_endpoint().await;
                Err(LinkError::Write {
                    cause: e.to_string(),
                })
            }
        }
    }

    async fn handle_close(&mut self) -> Result<(), LinkError> {
        if self.endpoint.is_none() {
            debug!("close with no open endpoint");
            return Ok(());
        }
        self.release_endpoint().await
    }

    /// Release output, then input, then the connection, attempting each step
    /// even if an earlier one failed. The first failure is the one returned.
    async fn release_endpoint(&mut self) -> Result<(), LinkError> {
        let Some(mut endpoint) = self.endpoint.take() else {
            return Ok(());
        };
        self.set_state(LinkState::Closing);

        let mut first_failure: Option<io::Error> = None;
        if let Err(e) = endpoint.close_output().await {
            first_failure = Some(e);
        }
        if let Err(e) = endpoint.close_input().await {
            first_failure.get_or_insert(e);
        }
        if let Err(e) = endpoint.close().await {
            first_failure.get_or_insert(e);
        }

        self.set_state(LinkState::Closed);
        match first_failure {
            None => Ok(()),
            Some(e) => Err(LinkError::Close {
                cause: e.to_string(),
            }),
        }
    }
}

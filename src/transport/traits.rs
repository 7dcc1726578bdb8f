//! Transport trait abstraction for pluggable link backends

use crate::transport::adapter::TargetDescriptor;
use async_trait::async_trait;
use std::io;

/// A duplex endpoint to a remote peer.
///
/// The handle owns the raw connection plus independently-closable input and
/// output stream halves. Callers must serialize access: at most one of
/// connect/send/close may be in flight at a time.
#[async_trait]
pub trait Endpoint: Send {
    /// Perform the handshake against the remote peer. Blocks the task until
    /// the link is established or fails.
    async fn connect(&mut self) -> io::Result<()>;

    /// Write the whole message and flush it onto the wire.
    async fn send(&mut self, message: &[u8]) -> io::Result<()>;

    /// Close the output stream half.
    async fn close_output(&mut self) -> io::Result<()>;

    /// Close the input stream half.
    async fn close_input(&mut self) -> io::Result<()>;

    /// Close the underlying connection.
    async fn close(&mut self) -> io::Result<()>;
}

/// Factory for creating endpoints toward a chosen target
#[async_trait]
pub trait Connector: Send + Sync {
    /// Produce an endpoint for the target, ready for `connect`.
    async fn open(&self, target: &TargetDescriptor) -> io::Result<Box<dyn Endpoint>>;

    /// Human-readable name for this transport
    fn name(&self) -> &'static str;
}

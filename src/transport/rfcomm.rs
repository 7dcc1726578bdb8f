//! RFCOMM transport implementation for Bluetooth links

use crate::transport::adapter::TargetDescriptor;
use crate::transport::traits::{Connector, Endpoint};
use async_trait::async_trait;
use bluer::rfcomm::stream::{OwnedReadHalf, OwnedWriteHalf};
use bluer::rfcomm::{SocketAddr as RfcommAddr, Stream as RfcommStream};
use bluer::{Address, Uuid};
use std::io;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Service UUID the remote peer must advertise. Both ends of the link agree
/// on this value; it is application-specific, not a standard profile.
pub const SERVICE_UUID: Uuid = Uuid::from_u128(0x11111111_1111_1111_1111_111111111123);

/// Default RFCOMM channel for the sensor service
pub const DEFAULT_RFCOMM_CHANNEL: u8 = 1;

/// Configuration for the RFCOMM connector
#[derive(Debug, Clone)]
pub struct RfcommConfig {
    /// RFCOMM channel number
    pub channel: u8,
}

impl Default for RfcommConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_RFCOMM_CHANNEL,
        }
    }
}

/// Connector producing RFCOMM endpoints toward paired devices
pub struct RfcommConnector {
    config: RfcommConfig,
}

impl RfcommConnector {
    pub fn new(config: RfcommConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for RfcommConnector {
    async fn open(&self, target: &TargetDescriptor) -> io::Result<Box<dyn Endpoint>> {
        Ok(Box::new(RfcommEndpoint::new(
            target.address,
            self.config.channel,
        )))
    }

    fn name(&self) -> &'static str {
        "Bluetooth"
    }
}

/// RFCOMM endpoint holding the split read/write halves of the stream
pub struct RfcommEndpoint {
    peer_addr: Address,
    channel: u8,
    reader: Option<OwnedReadHalf>,
    writer: Option<OwnedWriteHalf>,
}

impl RfcommEndpoint {
    pub fn new(peer_addr: Address, channel: u8) -> Self {
        Self {
            peer_addr,
            channel,
            reader: None,
            writer: None,
        }
    }

    /// The peer Bluetooth address
    pub fn peer_address(&self) -> Address {
        self.peer_addr
    }
}

#[async_trait]
impl Endpoint for RfcommEndpoint {
    async fn connect(&mut self) -> io::Result<()> {
        let socket_addr = RfcommAddr::new(self.peer_addr, self.channel);
        info!(
            "connecting to {} channel {} (service {})",
            self.peer_addr, self.channel, SERVICE_UUID
        );
        let stream = RfcommStream::connect(socket_addr).await?;
        let (reader, writer) = stream.into_split();
        self.reader = Some(reader);
        self.writer = Some(writer);
        info!("connected to {}", self.peer_addr);
        Ok(())
    }

    async fn send(&mut self, message: &[u8]) -> io::Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "link not connected"))?;
        writer.write_all(message).await?;
        writer.flush().await
    }

    async fn close_output(&mut self) -> io::Result<()> {
        match self.writer.take() {
            Some(mut writer) => writer.shutdown().await,
            None => Ok(()),
        }
    }

    async fn close_input(&mut self) -> io::Result<()> {
        // The read half releases its end of the socket on drop.
        drop(self.reader.take());
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        // Both halves gone closes the underlying socket.
        drop(self.writer.take());
        drop(self.reader.take());
        Ok(())
    }
}

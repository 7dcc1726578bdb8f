//! Streams accelerometer readings to a remote peer over a Bluetooth RFCOMM
//! link.
//!
//! The crate is built around a per-link worker task that owns the endpoint
//! handle and its lifecycle state; the [`SensorLink`] facade enqueues
//! connect/send/close operations and never blocks the caller. Failures are
//! reported once to an injected [`StatusSink`] and the link ends up Closed,
//! never half-open.

pub mod error;
pub mod link;
pub mod sensor;
pub mod status;
pub mod transport;

pub use error::LinkError;
pub use link::{LinkConfig, LinkState, SensorLink};
pub use sensor::AccelReading;
pub use status::{LogSink, StatusSink};
pub use transport::{BtPlatform, RfcommConfig, RfcommConnector, TargetDescriptor};

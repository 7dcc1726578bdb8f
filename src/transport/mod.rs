pub mod adapter;
pub mod rfcomm;
pub mod traits;

pub use adapter::{BtPlatform, TargetDescriptor};
pub use rfcomm::{RfcommConfig, RfcommConnector, RfcommEndpoint, DEFAULT_RFCOMM_CHANNEL, SERVICE_UUID};
pub use traits::{Connector, Endpoint};

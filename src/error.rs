//! Error kinds for link lifecycle operations

use thiserror::Error;

/// Errors that can occur while initializing or operating the link
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("no Bluetooth adapter present on this device")]
    NoAdapter,

    #[error("Bluetooth is disabled on this device")]
    AdapterDisabled,

    #[error("connect to {target} failed: {cause}")]
    Connect { target: String, cause: String },

    #[error("write failed: {cause}")]
    Write { cause: String },

    #[error("close failed: {cause}")]
    Close { cause: String },
}

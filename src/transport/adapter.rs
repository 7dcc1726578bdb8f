//! Bluetooth adapter access and paired-device enumeration

use crate::error::LinkError;
use anyhow::Result;
use bluer::{Adapter, Address, Session};
use std::fmt;
use tracing::debug;

/// A remote device available for connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    /// Bluetooth MAC address
    pub address: Address,
    /// Advertised device name (if known)
    pub name: Option<String>,
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({})", name, self.address),
            None => write!(f, "{}", self.address),
        }
    }
}

/// Handle to the local Bluetooth adapter
pub struct BtPlatform {
    adapter: Adapter,
    _session: Session,
}

impl BtPlatform {
    /// Verify a Bluetooth adapter is present and enabled, and take a handle
    /// to it. Fails with `NoAdapter` if the device has no usable adapter and
    /// `AdapterDisabled` if it is switched off.
    pub async fn initialize() -> Result<Self, LinkError> {
        let session = Session::new().await.map_err(|_| LinkError::NoAdapter)?;
        let adapter = session
            .default_adapter()
            .await
            .map_err(|_| LinkError::NoAdapter)?;
        let enabled = adapter
            .is_powered()
            .await
            .map_err(|_| LinkError::AdapterDisabled)?;
        if !enabled {
            return Err(LinkError::AdapterDisabled);
        }
        debug!("using adapter {}", adapter.name());
        Ok(Self {
            adapter,
            _session: session,
        })
    }

    /// Name of the adapter in use (e.g. `hci0`)
    pub fn adapter_name(&self) -> &str {
        self.adapter.name()
    }

    /// Enumerate previously paired devices. Queried fresh on every call, no
    /// filtering beyond the paired flag.
    pub async fn paired_targets(&self) -> Result<Vec<TargetDescriptor>> {
        let mut targets = Vec::new();
        for address in self.adapter.device_addresses().await? {
            let device = self.adapter.device(address)?;
            if device.is_paired().await? {
                targets.push(TargetDescriptor {
                    address,
                    name: device.name().await?,
                });
            }
        }
        Ok(targets)
    }
}

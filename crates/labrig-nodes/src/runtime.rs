//! Container runtime seam.
//!
//! The runtime starts containers and owns the management network. Drivers
//! only need to read the management network description at deploy time.

/// Management network description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MgmtNet {
    /// IPv4 gateway (empty when the network has no IPv4).
    pub ipv4_gw: String,
    /// IPv6 gateway (empty when the network has no IPv6).
    pub ipv6_gw: String,
}

/// A container runtime as seen by node drivers.
pub trait ContainerRuntime: Send + Sync {
    /// Runtime name.
    fn name(&self) -> &str;

    /// The management network, created before any node is deployed.
    fn mgmt(&self) -> &MgmtNet;
}

/// Runtime with a fixed, already created management network.
#[derive(Debug, Clone, Default)]
pub struct StaticRuntime {
    name: String,
    mgmt: MgmtNet,
}

impl StaticRuntime {
    /// Create a runtime description.
    pub fn new(name: &str, mgmt: MgmtNet) -> Self {
        Self {
            name: name.to_string(),
            mgmt,
        }
    }

    /// Set the management gateways.
    #[must_use]
    pub fn with_gateways(mut self, ipv4_gw: &str, ipv6_gw: &str) -> Self {
        self.mgmt.ipv4_gw = ipv4_gw.to_string();
        self.mgmt.ipv6_gw = ipv6_gw.to_string();
        self
    }
}

impl ContainerRuntime for StaticRuntime {
    fn name(&self) -> &str {
        &self.name
    }

    fn mgmt(&self) -> &MgmtNet {
        &self.mgmt
    }
}

//! Remote management sessions.

use async_trait::async_trait;
use labrig_common::LabResult;

pub mod netconf;

pub use netconf::NetconfSession;

/// Where and as whom to open a management session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTarget {
    /// Management address (IP or resolvable name).
    pub address: String,
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
    /// Platform identifier of the device.
    pub platform: String,
}

/// Authenticated remote management of a running node.
#[async_trait]
pub trait ManagementSession: Send + Sync {
    /// Save the running configuration into the startup configuration.
    ///
    /// # Errors
    ///
    /// Returns a session error if the session cannot be opened or the device
    /// rejects the request.
    async fn save_running_config(&self, target: &SessionTarget) -> LabResult<()>;
}

//! Generic node configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use labrig_common::{LabError, LabResult};
use serde::{Deserialize, Serialize};

/// Configuration of one node instance.
///
/// Created by the orchestrator, handed to the driver at init and filled in by
/// the lifecycle operations (environment, binds, resolved startup-config and
/// management gateways).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node kind (any registered alias).
    #[serde(default)]
    pub kind: String,

    /// Name of the node inside its lab.
    #[serde(default)]
    pub short_name: String,

    /// Host-unique name of the node's container.
    #[serde(default)]
    pub long_name: String,

    /// Container image.
    #[serde(default)]
    pub image: Option<String>,

    /// Per-node working directory.
    #[serde(default)]
    pub lab_dir: PathBuf,

    /// Environment variables passed to the container.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Bind mounts (`host:container[:mode]`).
    #[serde(default)]
    pub binds: Vec<String>,

    /// User supplied startup-config file.
    #[serde(default)]
    pub startup_config: Option<PathBuf>,

    /// Overwrite an existing generated config with `startup_config`.
    #[serde(default)]
    pub enforce_startup_config: bool,

    /// Resolved path of the generated startup-config.
    #[serde(default)]
    pub res_startup_config: Option<PathBuf>,

    /// Management IPv4 address of the node.
    #[serde(default)]
    pub mgmt_ipv4_address: Option<String>,

    /// Management network IPv4 gateway.
    #[serde(default)]
    pub mgmt_ipv4_gateway: Option<String>,

    /// Management network IPv6 gateway.
    #[serde(default)]
    pub mgmt_ipv6_gateway: Option<String>,
}

impl NodeConfig {
    /// Create a config for a node of `kind` living in `lab_dir`.
    pub fn new(kind: &str, short_name: &str, lab_dir: impl Into<PathBuf>) -> Self {
        Self {
            kind: kind.to_string(),
            short_name: short_name.to_string(),
            long_name: short_name.to_string(),
            lab_dir: lab_dir.into(),
            ..Self::default()
        }
    }

    /// Parse from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid node definition.
    pub fn from_yaml(yaml: &str) -> LabResult<Self> {
        let cfg: Self = serde_yaml::from_str(yaml)?;
        if cfg.kind.is_empty() || cfg.short_name.is_empty() {
            return Err(LabError::Config {
                message: "node definition requires 'kind' and 'short_name'".to_string(),
            });
        }
        Ok(cfg)
    }

    /// Parse from file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> LabResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LabError::fs(path, e))?;
        Self::from_yaml(&content)
    }

    /// Address used to reach the node's management interface.
    ///
    /// Falls back to the long name, which the host resolves to the container.
    #[must_use]
    pub fn mgmt_address(&self) -> &str {
        match self.mgmt_ipv4_address.as_deref() {
            Some(addr) if !addr.is_empty() => addr,
            _ => &self.long_name,
        }
    }
}

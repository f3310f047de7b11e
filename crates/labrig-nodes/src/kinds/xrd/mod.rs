//! Cisco XRd node kind.
//!
//! XRd boots from a first-boot config mounted into the container and learns
//! its interface layout from environment variables. `/xr-storage` is mounted
//! from the lab directory and persists across container restarts.

use std::collections::BTreeMap;

use async_trait::async_trait;
use labrig_common::paths::create_directory;
use labrig_common::{LabError, LabPaths, LabResult, merge_string_maps};
use tokio_util::sync::CancellationToken;

use crate::config::NodeConfig;
use crate::node::{Node, NodeOptions, NodeState, invalid_state};
use crate::registry::{NodeKindDescriptor, NodeRegistry};
use crate::session::SessionTarget;
use crate::template::{StartupTemplate, TemplateVars, generate_config};

pub mod interfaces;

pub use interfaces::{InterfaceMapping, MAX_INTERFACES, interface_mappings, interfaces_env};

/// XRd kind description.
pub const KIND: NodeKindDescriptor = NodeKindDescriptor {
    aliases: &["xrd", "cisco_xrd"],
    default_username: "clab",
    default_password: "clab@123",
    management_protocol: "cisco_iosxr",
};

/// Default first-boot configuration.
pub const CONFIG_TEMPLATE: &str = include_str!("xrd.cfg");

/// First-boot config path inside the container.
pub const FIRST_BOOT_CONFIG_PATH: &str = "/etc/xrd/first-boot.cfg";

/// Persistent storage path inside the container.
pub const XR_STORAGE_PATH: &str = "/xr-storage";

/// Environment variable carrying the data interface table.
pub const XR_INTERFACES_ENV: &str = "XR_INTERFACES";

const MGMT_INTERFACES: &str = "linux:eth0,xr_name=Mg0/RP0/CPU0/0,chksum,snoop_v4,snoop_v6";

const DIR_MODE: u32 = 0o777;

/// Environment every XRd container gets.
#[must_use]
pub fn kind_env() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "XR_FIRST_BOOT_CONFIG".to_string(),
            FIRST_BOOT_CONFIG_PATH.to_string(),
        ),
        ("XR_MGMT_INTERFACES".to_string(), MGMT_INTERFACES.to_string()),
    ])
}

/// Register the XRd kind.
///
/// # Errors
///
/// Returns an error if one of the XRd aliases is already registered.
pub fn register(registry: &NodeRegistry) -> LabResult<()> {
    registry.register_kind(&KIND, new_node)
}

fn new_node() -> Box<dyn Node> {
    Box::new(Xrd::default())
}

/// XRd driver bound to one node.
#[derive(Debug, Default)]
pub struct Xrd {
    cfg: NodeConfig,
    opts: NodeOptions,
    state: NodeState,
}

impl Xrd {
    fn create_xrd_files(&mut self, cancel: &CancellationToken) -> LabResult<()> {
        let storage = LabPaths::xr_storage(&self.cfg.lab_dir);
        create_directory(&storage, DIR_MODE).map_err(|e| LabError::fs(&storage, e))?;

        let dst = LabPaths::first_boot_config(&self.cfg.lab_dir);
        self.cfg.res_startup_config = Some(dst.clone());

        // mgmt network is created before any node is deployed
        let mgmt = self.opts.runtime.mgmt();
        self.cfg.mgmt_ipv4_gateway = non_empty(&mgmt.ipv4_gw);
        self.cfg.mgmt_ipv6_gateway = non_empty(&mgmt.ipv6_gw);
        tracing::debug!(
            node = %self.cfg.short_name,
            runtime = self.opts.runtime.name(),
            ipv4_gw = ?self.cfg.mgmt_ipv4_gateway,
            ipv6_gw = ?self.cfg.mgmt_ipv6_gateway,
            "Management gateways"
        );

        let template = match &self.cfg.startup_config {
            Some(path) => StartupTemplate::UserSupplied(std::fs::read_to_string(path).map_err(
                |source| LabError::StartupConfigRead {
                    path: path.clone(),
                    source,
                },
            )?),
            None => StartupTemplate::Embedded(CONFIG_TEMPLATE),
        };

        if cancel.is_cancelled() {
            return Err(LabError::Cancelled {
                operation: "pre-deploy",
            });
        }

        let vars = TemplateVars::new(&self.cfg, KIND.default_username, KIND.default_password);
        generate_config(self.opts.renderer.as_ref(), &self.cfg, &dst, &template, &vars)
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[async_trait]
impl Node for Xrd {
    fn init(&mut self, cfg: NodeConfig, opts: NodeOptions) -> LabResult<()> {
        if self.state != NodeState::Unconfigured {
            return Err(invalid_state(&self.cfg, "init", self.state));
        }
        self.cfg = cfg;
        self.opts = opts;

        let interfaces = BTreeMap::from([(
            XR_INTERFACES_ENV.to_string(),
            interfaces_env(MAX_INTERFACES),
        )]);
        self.cfg.env = merge_string_maps([&kind_env(), &interfaces, &self.cfg.env]);

        let lab_dir = &self.cfg.lab_dir;
        let binds = [
            format!(
                "{}:{FIRST_BOOT_CONFIG_PATH}",
                LabPaths::first_boot_config(lab_dir).display()
            ),
            format!(
                "{}:{XR_STORAGE_PATH}",
                LabPaths::xr_storage(lab_dir).display()
            ),
        ];
        self.cfg.binds.extend(binds);

        self.state = NodeState::Initialized;
        Ok(())
    }

    fn config(&self) -> &NodeConfig {
        &self.cfg
    }

    fn state(&self) -> NodeState {
        self.state
    }

    async fn pre_deploy(&mut self, cancel: &CancellationToken) -> LabResult<()> {
        if self.state != NodeState::Initialized {
            return Err(invalid_state(&self.cfg, "pre-deploy", self.state));
        }

        let lab_dir = self.cfg.lab_dir.clone();
        create_directory(&lab_dir, DIR_MODE).map_err(|e| LabError::fs(&lab_dir, e))?;
        self.create_xrd_files(cancel)?;

        self.state = NodeState::Predeployed;
        Ok(())
    }

    async fn post_deploy(&mut self, _cancel: &CancellationToken) -> LabResult<()> {
        if self.state != NodeState::Predeployed {
            return Err(invalid_state(&self.cfg, "post-deploy", self.state));
        }
        self.state = NodeState::Running;
        Ok(())
    }

    async fn save_config(&self, cancel: &CancellationToken) -> LabResult<()> {
        if self.state == NodeState::Unconfigured {
            return Err(invalid_state(&self.cfg, "save config of", self.state));
        }

        let target = SessionTarget {
            address: self.cfg.mgmt_address().to_string(),
            username: KIND.default_username.to_string(),
            password: KIND.default_password.to_string(),
            platform: KIND.management_protocol.to_string(),
        };

        let save = tokio::time::timeout(
            self.opts.session_timeout,
            self.opts.session.save_running_config(&target),
        );
        tokio::select! {
            () = cancel.cancelled() => {
                return Err(LabError::Cancelled { operation: "save-config" });
            }
            res = save => match res {
                Ok(res) => res?,
                Err(_) => {
                    return Err(LabError::SessionConnect {
                        address: target.address.clone(),
                        message: format!(
                            "session timed out after {:?}",
                            self.opts.session_timeout
                        ),
                    });
                }
            },
        }

        tracing::info!(
            node = %self.cfg.short_name,
            "saved {} running configuration to startup configuration file",
            self.cfg.short_name
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_node(cfg: NodeConfig) -> Xrd {
        let mut node = Xrd::default();
        node.init(cfg, NodeOptions::default()).unwrap();
        node
    }

    #[test]
    fn init_sets_env_and_binds() {
        let node = init_node(NodeConfig::new("xrd", "xr1", "/tmp/lab1"));
        let cfg = node.config();

        assert_eq!(cfg.env["XR_FIRST_BOOT_CONFIG"], "/etc/xrd/first-boot.cfg");
        assert_eq!(cfg.env["XR_MGMT_INTERFACES"], MGMT_INTERFACES);
        assert_eq!(cfg.env[XR_INTERFACES_ENV], interfaces_env(90));
        assert_eq!(
            cfg.binds,
            vec![
                "/tmp/lab1/first-boot.cfg:/etc/xrd/first-boot.cfg".to_string(),
                "/tmp/lab1/xr-storage:/xr-storage".to_string(),
            ]
        );
        assert_eq!(node.state(), NodeState::Initialized);
    }

    #[test]
    fn user_env_wins() {
        let mut cfg = NodeConfig::new("xrd", "xr1", "/tmp/lab1");
        cfg.env.insert(
            "XR_FIRST_BOOT_CONFIG".to_string(),
            "/etc/xrd/custom.cfg".to_string(),
        );
        cfg.env
            .insert(XR_INTERFACES_ENV.to_string(), "linux:eth1,xr_name=Gi0/0/0/7;".to_string());
        cfg.env
            .insert("XR_EVERY_BOOT_CONFIG".to_string(), "/etc/xrd/every.cfg".to_string());

        let node = init_node(cfg);
        let env = &node.config().env;
        assert_eq!(env["XR_FIRST_BOOT_CONFIG"], "/etc/xrd/custom.cfg");
        assert_eq!(env[XR_INTERFACES_ENV], "linux:eth1,xr_name=Gi0/0/0/7;");
        assert_eq!(env["XR_EVERY_BOOT_CONFIG"], "/etc/xrd/every.cfg");
        assert_eq!(env["XR_MGMT_INTERFACES"], MGMT_INTERFACES);
    }

    #[test]
    fn init_is_deterministic() {
        let a = init_node(NodeConfig::new("xrd", "xr1", "/tmp/lab1"));
        let b = init_node(NodeConfig::new("xrd", "xr1", "/tmp/lab1"));
        assert_eq!(a.config(), b.config());
    }

    #[test]
    fn init_twice_is_rejected() {
        let mut node = init_node(NodeConfig::new("xrd", "xr1", "/tmp/lab1"));
        let err = node
            .init(NodeConfig::new("xrd", "xr1", "/tmp/lab1"), NodeOptions::default())
            .unwrap_err();
        assert!(matches!(err, LabError::InvalidState { .. }));
        assert_eq!(node.config().binds.len(), 2);
    }

    #[test]
    fn user_binds_are_kept() {
        let mut cfg = NodeConfig::new("xrd", "xr1", "/tmp/lab1");
        cfg.binds.push("/opt/scripts:/scripts".to_string());

        let node = init_node(cfg);
        assert_eq!(node.config().binds.len(), 3);
        assert_eq!(node.config().binds[0], "/opt/scripts:/scripts");
    }

    #[test]
    fn embedded_template_renders() {
        let vars = TemplateVars {
            short_name: "xr1".to_string(),
            username: KIND.default_username.to_string(),
            password: KIND.default_password.to_string(),
            mgmt_ipv4_gateway: Some("192.0.2.1".to_string()),
            ..TemplateVars::default()
        };
        let out = crate::template::TeraRenderer::render_str(CONFIG_TEMPLATE, &vars).unwrap();

        assert!(out.contains("hostname xr1\n"));
        assert!(out.contains("username clab\n"));
        assert!(out.contains(" password clab@123\n"));
        assert!(out.contains("router static\n address-family ipv4 unicast\n  0.0.0.0/0 MgmtEth0/RP0/CPU0/0 192.0.2.1\n"));
        assert!(!out.contains("ipv6 unicast"));
        assert!(out.ends_with("end\n"));
    }

    #[test]
    fn embedded_template_without_gateways() {
        let vars = TemplateVars {
            short_name: "xr1".to_string(),
            ..TemplateVars::default()
        };
        let out = crate::template::TeraRenderer::render_str(CONFIG_TEMPLATE, &vars).unwrap();
        assert!(!out.contains("router static"));
        assert!(out.contains("netconf-yang agent\n ssh\n!\nssh server v2\n"));
    }
}

//! # labrig-nodes
//!
//! Node kind drivers for labrig.
//!
//! A node kind knows how to turn a generic [`NodeConfig`] into something its
//! emulated device can boot from: environment variables, bind mounts and a
//! first-boot configuration file. The orchestrator drives every node through
//! the [`Node`] lifecycle:
//!
//! ```no_run
//! use labrig_nodes::{NodeConfig, NodeOptions, NodeRegistry, kinds};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> labrig_common::LabResult<()> {
//! let registry = NodeRegistry::new();
//! kinds::register_all(&registry)?;
//!
//! let cfg = NodeConfig::from_yaml("kind: xrd\nshort_name: xr1\nlab_dir: /tmp/lab1\n")?;
//! let mut node = registry.new_node(&cfg.kind)?;
//! node.init(cfg, NodeOptions::default())?;
//! node.pre_deploy(&CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod kinds;
pub mod node;
pub mod registry;
pub mod runtime;
pub mod session;
pub mod template;

pub use config::NodeConfig;
pub use node::{Node, NodeOptions, NodeState};
pub use registry::{Credentials, NodeKindDescriptor, NodeRegistry};
pub use runtime::{ContainerRuntime, MgmtNet, StaticRuntime};
pub use session::{ManagementSession, NetconfSession, SessionTarget};
pub use template::{ConfigRenderer, StartupTemplate, TemplateVars, TeraRenderer};

//! Node lifecycle.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use labrig_common::{LabError, LabResult};
use tokio_util::sync::CancellationToken;

use crate::config::NodeConfig;
use crate::runtime::{ContainerRuntime, StaticRuntime};
use crate::session::{ManagementSession, NetconfSession};
use crate::template::{ConfigRenderer, TeraRenderer};

/// Lifecycle of one node instance.
///
/// The orchestrator calls the operations of a given node sequentially, in
/// this order: [`init`](Node::init), [`pre_deploy`](Node::pre_deploy),
/// [`post_deploy`](Node::post_deploy), and then
/// [`save_config`](Node::save_config) any number of times.
#[async_trait]
pub trait Node: Send + Sync {
    /// Bind the driver to a node config and set env and binds.
    ///
    /// # Errors
    ///
    /// Returns [`LabError::InvalidState`] if the node was already initialized.
    fn init(&mut self, cfg: NodeConfig, opts: NodeOptions) -> LabResult<()>;

    /// Node config, as filled in by the lifecycle so far.
    fn config(&self) -> &NodeConfig;

    /// Current lifecycle state.
    fn state(&self) -> NodeState;

    /// Prepare the lab directory before the container is created.
    ///
    /// # Errors
    ///
    /// Returns an error if files cannot be created or the token is cancelled.
    async fn pre_deploy(&mut self, cancel: &CancellationToken) -> LabResult<()>;

    /// Called once the container is up.
    ///
    /// # Errors
    ///
    /// Returns [`LabError::InvalidState`] unless the node was predeployed.
    async fn post_deploy(&mut self, cancel: &CancellationToken) -> LabResult<()>;

    /// Persist the running configuration of the node.
    ///
    /// # Errors
    ///
    /// Returns a session error if the node cannot be reached or refuses.
    async fn save_config(&self, cancel: &CancellationToken) -> LabResult<()>;
}

/// Constructor of a fresh, unconfigured driver.
pub type NodeConstructor = fn() -> Box<dyn Node>;

/// Lifecycle states of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NodeState {
    /// Constructed, not yet initialized.
    #[default]
    Unconfigured,
    /// Env and binds are set.
    Initialized,
    /// Lab directory is prepared.
    Predeployed,
    /// Container is up.
    Running,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconfigured => write!(f, "unconfigured"),
            Self::Initialized => write!(f, "initialized"),
            Self::Predeployed => write!(f, "predeployed"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// Build the error for an operation called in the wrong state.
pub fn invalid_state(cfg: &NodeConfig, operation: &'static str, state: NodeState) -> LabError {
    LabError::InvalidState {
        node: cfg.short_name.clone(),
        operation,
        state: state.to_string(),
    }
}

/// Collaborators injected into a driver at init.
#[derive(Clone)]
pub struct NodeOptions {
    /// Runtime that owns the node's container.
    pub runtime: Arc<dyn ContainerRuntime>,
    /// Startup-config renderer.
    pub renderer: Arc<dyn ConfigRenderer>,
    /// Management session used by save-config.
    pub session: Arc<dyn ManagementSession>,
    /// Upper bound for a save-config session.
    pub session_timeout: Duration,
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self {
            runtime: Arc::new(StaticRuntime::default()),
            renderer: Arc::new(TeraRenderer),
            session: Arc::new(NetconfSession::default()),
            session_timeout: Duration::from_secs(60),
        }
    }
}

impl fmt::Debug for NodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeOptions")
            .field("runtime", &self.runtime.name())
            .field("session_timeout", &self.session_timeout)
            .finish_non_exhaustive()
    }
}

impl NodeOptions {
    /// Set the container runtime.
    #[must_use]
    pub fn with_runtime(mut self, runtime: Arc<dyn ContainerRuntime>) -> Self {
        self.runtime = runtime;
        self
    }

    /// Set the startup-config renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn ConfigRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Set the management session.
    #[must_use]
    pub fn with_session(mut self, session: Arc<dyn ManagementSession>) -> Self {
        self.session = session;
        self
    }

    /// Set the save-config session timeout.
    #[must_use]
    pub const fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }
}

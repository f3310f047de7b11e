//! Common error types for labrig.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`LabError`].
pub type LabResult<T> = Result<T, LabError>;

/// Errors raised while registering, provisioning or managing lab nodes.
#[derive(Error, Diagnostic, Debug)]
pub enum LabError {
    /// A kind alias is already taken.
    #[error("Node kind already registered: {kind}")]
    #[diagnostic(
        code(labrig::registry::conflict),
        help("Every kind alias must be unique across all registered node kinds")
    )]
    RegistrationConflict {
        /// The conflicting alias.
        kind: String,
    },

    /// No driver is registered under the requested kind.
    #[error("Unknown node kind: {kind}")]
    #[diagnostic(code(labrig::registry::unknown_kind))]
    UnknownKind {
        /// The requested kind.
        kind: String,
    },

    /// A lifecycle operation was called out of order.
    #[error("Cannot {operation} node '{node}' in state {state}")]
    #[diagnostic(code(labrig::node::invalid_state))]
    InvalidState {
        /// Node short name.
        node: String,
        /// The rejected operation.
        operation: &'static str,
        /// The state the node was in.
        state: String,
    },

    /// Filesystem operation failed.
    #[error("Filesystem error at {}: {source}", path.display())]
    #[diagnostic(
        code(labrig::fs),
        help("Check that the lab directory is writable by the current user")
    )]
    Filesystem {
        /// Path being operated on.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The user supplied startup-config could not be read.
    #[error("Failed to read startup-config {}: {source}", path.display())]
    #[diagnostic(code(labrig::startup_config::read))]
    StartupConfigRead {
        /// Path to the startup-config.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Rendering or writing a configuration file failed.
    #[error("Failed to render {}: {message}", path.display())]
    #[diagnostic(code(labrig::render))]
    Render {
        /// Destination path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Management session could not be established.
    #[error("Management session to {address} failed: {message}")]
    #[diagnostic(
        code(labrig::session::connect),
        help("Make sure the node is running and its management interface is reachable")
    )]
    SessionConnect {
        /// Management address.
        address: String,
        /// Error message.
        message: String,
    },

    /// Management session authentication was refused.
    #[error("Authentication as '{username}' to {address} failed")]
    #[diagnostic(code(labrig::session::auth))]
    SessionAuth {
        /// Management address.
        address: String,
        /// Username used to authenticate.
        username: String,
    },

    /// The device rejected a management request.
    #[error("Request rejected by {address}: {message}")]
    #[diagnostic(code(labrig::session::rejected))]
    SessionRejected {
        /// Management address.
        address: String,
        /// Error reported by the device.
        message: String,
    },

    /// Operation aborted through its cancellation token.
    #[error("Operation cancelled: {operation}")]
    #[diagnostic(code(labrig::cancelled))]
    Cancelled {
        /// The cancelled operation.
        operation: &'static str,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(labrig::config))]
    Config {
        /// The error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(labrig::io))]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    #[diagnostic(code(labrig::serialization))]
    Serialization(String),
}

impl LabError {
    /// Wrap an I/O error with the path it happened on.
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from a management session.
    #[must_use]
    pub const fn is_session_error(&self) -> bool {
        matches!(
            self,
            Self::SessionConnect { .. } | Self::SessionAuth { .. } | Self::SessionRejected { .. }
        )
    }
}

impl From<serde_json::Error> for LabError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for LabError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

//! Node kind registry.

use std::collections::HashMap;

use labrig_common::{LabError, LabResult};
use parking_lot::RwLock;

use crate::node::{Node, NodeConstructor};

/// Static description of a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeKindDescriptor {
    /// Names the kind is registered under.
    pub aliases: &'static [&'static str],
    /// Default management username.
    pub default_username: &'static str,
    /// Default management password.
    pub default_password: &'static str,
    /// Platform identifier used by management sessions.
    pub management_protocol: &'static str,
}

/// Username and password pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Registry of node kinds and their default credentials.
///
/// Built once at start-up and then shared read-only.
#[derive(Default)]
pub struct NodeRegistry {
    kinds: RwLock<HashMap<String, NodeConstructor>>,
    descriptors: RwLock<HashMap<String, &'static NodeKindDescriptor>>,
    credentials: RwLock<HashMap<String, Credentials>>,
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("kinds", &self.kinds())
            .finish_non_exhaustive()
    }
}

impl NodeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under every alias.
    ///
    /// Nothing is registered if any alias is taken.
    ///
    /// # Errors
    ///
    /// Returns [`LabError::RegistrationConflict`] on a duplicate alias.
    pub fn register(&self, aliases: &[&str], constructor: NodeConstructor) -> LabResult<()> {
        let mut kinds = self.kinds.write();
        if let Some(taken) = aliases.iter().find(|a| kinds.contains_key(**a)) {
            return Err(LabError::RegistrationConflict {
                kind: (*taken).to_string(),
            });
        }
        for alias in aliases {
            kinds.insert((*alias).to_string(), constructor);
        }
        Ok(())
    }

    /// Associate default credentials with every alias.
    ///
    /// # Errors
    ///
    /// Returns [`LabError::RegistrationConflict`] if an alias already has credentials.
    pub fn set_default_credentials(
        &self,
        aliases: &[&str],
        username: &str,
        password: &str,
    ) -> LabResult<()> {
        let mut credentials = self.credentials.write();
        if let Some(taken) = aliases.iter().find(|a| credentials.contains_key(**a)) {
            return Err(LabError::RegistrationConflict {
                kind: (*taken).to_string(),
            });
        }
        for alias in aliases {
            credentials.insert(
                (*alias).to_string(),
                Credentials {
                    username: username.to_string(),
                    password: password.to_string(),
                },
            );
        }
        Ok(())
    }

    /// Register a kind, its descriptor and its default credentials.
    ///
    /// A credential conflict is logged and ignored: the kind stays usable.
    ///
    /// # Errors
    ///
    /// Returns [`LabError::RegistrationConflict`] if an alias is taken.
    pub fn register_kind(
        &self,
        kind: &'static NodeKindDescriptor,
        constructor: NodeConstructor,
    ) -> LabResult<()> {
        self.register(kind.aliases, constructor)?;
        let mut descriptors = self.descriptors.write();
        for alias in kind.aliases {
            descriptors.insert((*alias).to_string(), kind);
        }
        drop(descriptors);

        if let Err(e) =
            self.set_default_credentials(kind.aliases, kind.default_username, kind.default_password)
        {
            tracing::error!(error = %e, kinds = ?kind.aliases, "Failed to set default credentials");
        }
        Ok(())
    }

    /// Construct a fresh driver for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`LabError::UnknownKind`] if no driver is registered.
    pub fn new_node(&self, kind: &str) -> LabResult<Box<dyn Node>> {
        let constructor = self
            .kinds
            .read()
            .get(kind)
            .copied()
            .ok_or_else(|| LabError::UnknownKind {
                kind: kind.to_string(),
            })?;
        Ok(constructor())
    }

    /// Default credentials of `kind`.
    #[must_use]
    pub fn default_credentials(&self, kind: &str) -> Option<Credentials> {
        self.credentials.read().get(kind).cloned()
    }

    /// Descriptor of `kind`, if it was registered through [`register_kind`](Self::register_kind).
    #[must_use]
    pub fn descriptor(&self, kind: &str) -> Option<&'static NodeKindDescriptor> {
        self.descriptors.read().get(kind).copied()
    }

    /// All registered aliases, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.kinds.read().keys().cloned().collect();
        kinds.sort();
        kinds
    }
}

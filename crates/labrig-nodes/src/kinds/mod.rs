//! Built-in node kinds.

use labrig_common::LabResult;

use crate::registry::NodeRegistry;

pub mod xrd;

/// Register every built-in node kind.
///
/// # Errors
///
/// Returns an error if a kind alias is already registered.
pub fn register_all(registry: &NodeRegistry) -> LabResult<()> {
    xrd::register(registry)?;
    Ok(())
}

//! XRd interface naming.
//!
//! The container's `ethN` interfaces are handed to XR as
//! `GigabitEthernet0/0/0/{N-1}`. `eth0` is the management interface and is
//! never part of the data interface table.

use std::fmt;

/// Number of data interfaces announced to XR.
pub const MAX_INTERFACES: u32 = 90;

/// One `ethN` to XR interface mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceMapping {
    /// Slot number, starting at 1.
    pub slot: u32,
    /// Linux interface name inside the container.
    pub linux_name: String,
    /// XR interface name.
    pub xr_name: String,
}

impl InterfaceMapping {
    /// Mapping of a slot, `None` for slot 0.
    #[must_use]
    pub fn for_slot(slot: u32) -> Option<Self> {
        let port = slot.checked_sub(1)?;
        Some(Self {
            slot,
            linux_name: format!("eth{slot}"),
            xr_name: format!("Gi0/0/0/{port}"),
        })
    }
}

impl fmt::Display for InterfaceMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "linux:{},xr_name={}", self.linux_name, self.xr_name)
    }
}

/// Mappings for slots `1..=max`.
pub fn interface_mappings(max: u32) -> impl Iterator<Item = InterfaceMapping> {
    (1..=max).filter_map(InterfaceMapping::for_slot)
}

/// Value of `XR_INTERFACES` for slots `1..=max`.
///
/// Each mapping is terminated by `;`.
#[must_use]
pub fn interfaces_env(max: u32) -> String {
    interface_mappings(max).fold(String::new(), |mut env, mapping| {
        env.push_str(&mapping.to_string());
        env.push(';');
        env
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn first_slot() {
        assert!(InterfaceMapping::for_slot(0).is_none());
        let first = InterfaceMapping::for_slot(1).unwrap();
        assert_eq!(first.linux_name, "eth1");
        assert_eq!(first.xr_name, "Gi0/0/0/0");
    }

    #[test]
    fn env_encoding() {
        assert_eq!(
            interfaces_env(3),
            "linux:eth1,xr_name=Gi0/0/0/0;linux:eth2,xr_name=Gi0/0/0/1;linux:eth3,xr_name=Gi0/0/0/2;"
        );
        assert_eq!(interfaces_env(0), "");
    }

    #[test]
    fn full_table() {
        let env = interfaces_env(MAX_INTERFACES);
        let clauses: Vec<&str> = env.strip_suffix(';').unwrap().split(';').collect();
        assert_eq!(clauses.len(), 90);
        for (i, clause) in clauses.iter().enumerate() {
            assert_eq!(*clause, format!("linux:eth{},xr_name=Gi0/0/0/{}", i + 1, i));
        }
        assert!(env.ends_with("linux:eth90,xr_name=Gi0/0/0/89;"));
    }

    proptest! {
        #[test]
        fn slot_maps_to_previous_port(slot in 1..=MAX_INTERFACES) {
            let mapping = InterfaceMapping::for_slot(slot).unwrap();
            prop_assert_eq!(mapping.linux_name, format!("eth{slot}"));
            prop_assert_eq!(mapping.xr_name, format!("Gi0/0/0/{}", slot - 1));
        }

        #[test]
        fn clause_count_matches_max(max in 0u32..200) {
            let env = interfaces_env(max);
            prop_assert_eq!(env.matches(';').count() as u32, max);
            prop_assert_eq!(interfaces_env(max), env);
        }
    }
}

//! The standard connector set
//!
//! Fourteen connectors are always present: notification variants, RPC
//! variants, the direct call, shared data and the four hardware connectors.
//! Rows are declared in the textual kind syntax and parsed at load, so a
//! typo in this table fails start-up instead of producing a silently wrong
//! connector.

use crate::descriptor::{ConnectorDescriptor, EndpointSpec};
use crate::CatalogError;
use hardware::HardwareFormat;

/// Number of built-in connectors
pub const BUILTIN_COUNT: usize = 14;

struct BuiltinRow {
    name: &'static str,
    from: &'static str,
    from_threads: Option<u32>,
    to: &'static str,
    to_threads: Option<u32>,
    type_checking: bool,
    hardware: Option<HardwareFormat>,
    policy: Option<&'static str>,
    composed_from: Option<&'static str>,
    description: &'static str,
}

const CALL_POLICY: &str = "from->to, from->conn, to->conn";
const SHARED_POLICY: &str = "from->to, to->from, from->conn, to->conn";
const DEVICE_POLICY: &str = "from->to, from->conn";

static BUILTINS: [BuiltinRow; BUILTIN_COUNT] = [
    BuiltinRow {
        name: "seL4Notification",
        from: "Events",
        from_threads: Some(0),
        to: "Event",
        to_threads: None,
        type_checking: true,
        hardware: None,
        policy: Some(CALL_POLICY),
        composed_from: None,
        description: "Notification delivered to a callback thread in the receiver",
    },
    BuiltinRow {
        name: "seL4NotificationNative",
        from: "Events",
        from_threads: Some(0),
        to: "Event",
        to_threads: Some(0),
        type_checking: true,
        hardware: None,
        policy: Some(CALL_POLICY),
        composed_from: None,
        description: "Notification the receiver polls or waits on directly",
    },
    BuiltinRow {
        name: "seL4NotificationBind",
        from: "Events",
        from_threads: Some(0),
        to: "Event",
        to_threads: Some(0),
        type_checking: true,
        hardware: None,
        policy: Some(CALL_POLICY),
        composed_from: None,
        description: "Notification bound to the receiver's control thread",
    },
    BuiltinRow {
        name: "seL4RPCEvent",
        from: "Events",
        from_threads: None,
        to: "Event",
        to_threads: None,
        type_checking: true,
        hardware: None,
        policy: Some(CALL_POLICY),
        composed_from: Some("seL4RPCCall"),
        description: "Event emulated over a synchronous call",
    },
    BuiltinRow {
        name: "seL4RPCCall",
        from: "Procedures",
        from_threads: None,
        to: "Procedure",
        to_threads: None,
        type_checking: true,
        hardware: None,
        policy: Some(CALL_POLICY),
        composed_from: None,
        description: "Synchronous call/return over an endpoint",
    },
    BuiltinRow {
        name: "seL4RPCSimple",
        from: "Procedures",
        from_threads: None,
        to: "Procedure",
        to_threads: None,
        type_checking: true,
        hardware: None,
        policy: Some(CALL_POLICY),
        composed_from: None,
        description: "Synchronous call with arguments carried in message registers",
    },
    BuiltinRow {
        name: "seL4RPCDataport",
        from: "Procedures",
        from_threads: None,
        to: "Procedure",
        to_threads: None,
        type_checking: true,
        hardware: None,
        policy: Some(SHARED_POLICY),
        composed_from: None,
        description: "Synchronous call with arguments carried in a shared buffer",
    },
    BuiltinRow {
        name: "seL4RPCCallNoType",
        from: "Procedures",
        from_threads: None,
        to: "Procedure",
        to_threads: None,
        type_checking: false,
        hardware: None,
        policy: Some(CALL_POLICY),
        composed_from: None,
        description: "Synchronous call without interface type checking",
    },
    BuiltinRow {
        name: "seL4DirectCall",
        from: "Procedures",
        from_threads: Some(0),
        to: "Procedure",
        to_threads: Some(0),
        type_checking: true,
        hardware: None,
        policy: None,
        composed_from: None,
        description: "Plain function call between components sharing a protection domain",
    },
    BuiltinRow {
        name: "seL4SharedData",
        from: "Dataports",
        from_threads: None,
        to: "Dataports",
        to_threads: None,
        type_checking: true,
        hardware: None,
        policy: Some(SHARED_POLICY),
        composed_from: None,
        description: "Shared memory window",
    },
    BuiltinRow {
        name: "seL4HardwareMMIO",
        from: "Dataports",
        from_threads: None,
        to: "hardware Dataport",
        to_threads: None,
        type_checking: true,
        hardware: Some(HardwareFormat::Mmio),
        policy: Some(DEVICE_POLICY),
        composed_from: None,
        description: "Device register window mapped into the component",
    },
    BuiltinRow {
        name: "seL4HardwareInterrupt",
        from: "hardware Event",
        from_threads: None,
        to: "Event",
        to_threads: None,
        type_checking: true,
        hardware: Some(HardwareFormat::Interrupt),
        policy: Some("from->to, to->conn"),
        composed_from: None,
        description: "Device interrupt line delivered as an event",
    },
    BuiltinRow {
        name: "seL4HardwareIOPort",
        from: "Procedures",
        from_threads: None,
        to: "hardware Procedure",
        to_threads: None,
        type_checking: true,
        hardware: Some(HardwareFormat::IoPort),
        policy: Some(DEVICE_POLICY),
        composed_from: None,
        description: "I/O port range exposed as a procedure interface",
    },
    BuiltinRow {
        name: "seL4DTBHardware",
        from: "Dataports",
        from_threads: None,
        to: "hardware Dataport",
        to_threads: None,
        type_checking: true,
        hardware: Some(HardwareFormat::DeviceTree),
        policy: Some(DEVICE_POLICY),
        composed_from: None,
        description: "Device resources derived from a device-tree node",
    },
];

/// Builds the standard descriptors
pub fn builtin_descriptors() -> Result<Vec<ConnectorDescriptor>, CatalogError> {
    BUILTINS.iter().map(BuiltinRow::descriptor).collect()
}

impl BuiltinRow {
    fn descriptor(&self) -> Result<ConnectorDescriptor, CatalogError> {
        let mut from = EndpointSpec::parse(self.from)?;
        from.threads = self.from_threads;
        let mut to = EndpointSpec::parse(self.to)?;
        to.threads = self.to_threads;

        let mut descriptor =
            ConnectorDescriptor::new(self.name, from, to).with_description(self.description);
        if !self.type_checking {
            descriptor = descriptor.without_type_checking();
        }
        if let Some(format) = self.hardware {
            descriptor = descriptor.with_hardware_format(format);
        }
        if let Some(relation) = self.policy {
            descriptor = descriptor.attach_policy(relation)?;
        }
        if let Some(primitive) = self.composed_from {
            descriptor = descriptor.composed_from(primitive);
        }
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::EndpointRole;
    use std::collections::BTreeSet;

    #[test]
    fn test_builtins_parse() {
        let descriptors = builtin_descriptors().unwrap();
        assert_eq!(descriptors.len(), BUILTIN_COUNT);
    }

    #[test]
    fn test_builtin_names_are_unique() {
        let names: BTreeSet<_> = BUILTINS.iter().map(|row| row.name).collect();
        assert_eq!(names.len(), BUILTIN_COUNT);
    }

    #[test]
    fn test_builtins_pass_their_own_checks() {
        for descriptor in builtin_descriptors().unwrap() {
            descriptor
                .check()
                .unwrap_or_else(|e| panic!("{} failed: {}", descriptor.name, e));
        }
    }

    #[test]
    fn test_four_hardware_connectors() {
        let hardware: Vec<_> = builtin_descriptors()
            .unwrap()
            .into_iter()
            .filter(|d| d.hardware_role().is_some())
            .map(|d| d.name)
            .collect();
        assert_eq!(
            hardware,
            vec![
                "seL4HardwareMMIO",
                "seL4HardwareInterrupt",
                "seL4HardwareIOPort",
                "seL4DTBHardware"
            ]
        );
    }

    #[test]
    fn test_rpc_event_is_composed() {
        let descriptor = builtin_descriptors()
            .unwrap()
            .into_iter()
            .find(|d| d.name == "seL4RPCEvent")
            .unwrap();
        assert!(!descriptor.is_builtin());
        assert!(descriptor.delivers_asynchronously());
    }

    #[test]
    fn test_interrupt_hardware_is_from_side() {
        let descriptor = builtin_descriptors()
            .unwrap()
            .into_iter()
            .find(|d| d.name == "seL4HardwareInterrupt")
            .unwrap();
        assert_eq!(descriptor.hardware_role(), Some(EndpointRole::From));
    }
}

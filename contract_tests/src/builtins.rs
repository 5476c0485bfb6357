//! Standard connector contract tests
//!
//! These tests define the stable shape of the fourteen standard connectors.

use crate::test_helpers::ConnectorContract;
use hardware::HardwareFormat;

// ===== Access policies =====
const CALL: &str = "from->to, from->conn, to->conn";
const SHARED: &str = "from->to, to->from, from->conn, to->conn";
const DEVICE: &str = "from->to, from->conn";
const INTERRUPT: &str = "from->to, to->conn";

// ===== Canonical Contracts =====

pub const STANDARD_CONNECTORS: [ConnectorContract; 14] = [
    ConnectorContract {
        name: "seL4Notification",
        from: "Events",
        from_threads: Some(0),
        to: "Event",
        to_threads: None,
        type_checking: true,
        hardware: None,
        policy: CALL,
        composed_from: None,
    },
    ConnectorContract {
        name: "seL4NotificationNative",
        from: "Events",
        from_threads: Some(0),
        to: "Event",
        to_threads: Some(0),
        type_checking: true,
        hardware: None,
        policy: CALL,
        composed_from: None,
    },
    ConnectorContract {
        name: "seL4NotificationBind",
        from: "Events",
        from_threads: Some(0),
        to: "Event",
        to_threads: Some(0),
        type_checking: true,
        hardware: None,
        policy: CALL,
        composed_from: None,
    },
    ConnectorContract {
        name: "seL4RPCEvent",
        from: "Events",
        from_threads: None,
        to: "Event",
        to_threads: None,
        type_checking: true,
        hardware: None,
        policy: CALL,
        composed_from: Some("seL4RPCCall"),
    },
    ConnectorContract {
        name: "seL4RPCCall",
        from: "Procedures",
        from_threads: None,
        to: "Procedure",
        to_threads: None,
        type_checking: true,
        hardware: None,
        policy: CALL,
        composed_from: None,
    },
    ConnectorContract {
        name: "seL4RPCSimple",
        from: "Procedures",
        from_threads: None,
        to: "Procedure",
        to_threads: None,
        type_checking: true,
        hardware: None,
        policy: CALL,
        composed_from: None,
    },
    ConnectorContract {
        name: "seL4RPCDataport",
        from: "Procedures",
        from_threads: None,
        to: "Procedure",
        to_threads: None,
        type_checking: true,
        hardware: None,
        policy: SHARED,
        composed_from: None,
    },
    ConnectorContract {
        name: "seL4RPCCallNoType",
        from: "Procedures",
        from_threads: None,
        to: "Procedure",
        to_threads: None,
        type_checking: false,
        hardware: None,
        policy: CALL,
        composed_from: None,
    },
    ConnectorContract {
        name: "seL4DirectCall",
        from: "Procedures",
        from_threads: Some(0),
        to: "Procedure",
        to_threads: Some(0),
        type_checking: true,
        hardware: None,
        policy: "none",
        composed_from: None,
    },
    ConnectorContract {
        name: "seL4SharedData",
        from: "Dataports",
        from_threads: None,
        to: "Dataports",
        to_threads: None,
        type_checking: true,
        hardware: None,
        policy: SHARED,
        composed_from: None,
    },
    ConnectorContract {
        name: "seL4HardwareMMIO",
        from: "Dataports",
        from_threads: None,
        to: "hardware Dataport",
        to_threads: None,
        type_checking: true,
        hardware: Some(HardwareFormat::Mmio),
        policy: DEVICE,
        composed_from: None,
    },
    ConnectorContract {
        name: "seL4HardwareInterrupt",
        from: "hardware Event",
        from_threads: None,
        to: "Event",
        to_threads: None,
        type_checking: true,
        hardware: Some(HardwareFormat::Interrupt),
        policy: INTERRUPT,
        composed_from: None,
    },
    ConnectorContract {
        name: "seL4HardwareIOPort",
        from: "Procedures",
        from_threads: None,
        to: "hardware Procedure",
        to_threads: None,
        type_checking: true,
        hardware: Some(HardwareFormat::IoPort),
        policy: DEVICE,
        composed_from: None,
    },
    ConnectorContract {
        name: "seL4DTBHardware",
        from: "Dataports",
        from_threads: None,
        to: "hardware Dataport",
        to_threads: None,
        type_checking: true,
        hardware: Some(HardwareFormat::DeviceTree),
        policy: DEVICE,
        composed_from: None,
    },
];

// ===== Contract Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use connectors::{builtin_table, BUILTIN_COUNT};
    use std::collections::BTreeSet;

    #[test]
    fn test_standard_connector_contracts() {
        for contract in &STANDARD_CONNECTORS {
            verify_connector_contract(contract);
        }
    }

    #[test]
    fn test_standard_set_is_closed() {
        let table = builtin_table().unwrap();
        assert_eq!(table.len(), BUILTIN_COUNT);
        let expected: BTreeSet<_> = STANDARD_CONNECTORS.iter().map(|c| c.name).collect();
        let actual: BTreeSet<_> = table.names().collect();
        assert_eq!(actual, expected, "standard connector set changed");
    }

    #[test]
    fn test_hardware_connectors_name_one_side() {
        for contract in STANDARD_CONNECTORS.iter().filter(|c| c.hardware.is_some()) {
            let hardware_sides = [contract.from, contract.to]
                .iter()
                .filter(|kind| kind.starts_with("hardware "))
                .count();
            assert_eq!(hardware_sides, 1, "{}", contract.name);
        }
    }

    #[test]
    fn test_only_rpc_event_is_composed() {
        let composed: Vec<_> = builtin_table()
            .unwrap()
            .iter()
            .filter(|d| !d.is_builtin())
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(composed, vec!["seL4RPCEvent"]);
    }

    #[test]
    fn test_notification_senders_never_block() {
        for name in ["seL4Notification", "seL4NotificationNative", "seL4NotificationBind"] {
            assert_eq!(standard(name).from.threads, Some(0), "{}", name);
        }
    }
}

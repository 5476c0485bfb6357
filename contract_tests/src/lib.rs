//! # Connector Contract Tests
//!
//! This crate provides "golden" tests for the standard connector set and the
//! JSON boundary formats, so they don't drift accidentally over time.
//!
//! ## Philosophy
//!
//! - **Explicit over implicit**: every standard connector is written out here
//! - **Testability first**: contract tests fail when a connector changes shape
//! - **Mechanism not policy**: define what must be stable, not how to use it
//!
//! ## Structure
//!
//! - `builtins`: kinds, thread counts, policies and formats of the fourteen
//!   standard connectors
//! - `manifest`: the connector manifest and build description formats
//! - `threading`: blocking contracts the generator relies on

pub mod builtins;
pub mod manifest;
pub mod threading;

/// Common helpers for contract validation
pub mod test_helpers {
    use connectors::{builtin_table, ConnectorDescriptor};
    use hardware::HardwareFormat;

    /// The frozen shape of one standard connector
    #[derive(Debug, Clone, Copy)]
    pub struct ConnectorContract {
        pub name: &'static str,
        pub from: &'static str,
        pub from_threads: Option<u32>,
        pub to: &'static str,
        pub to_threads: Option<u32>,
        pub type_checking: bool,
        pub hardware: Option<HardwareFormat>,
        pub policy: &'static str,
        pub composed_from: Option<&'static str>,
    }

    /// Looks up a standard connector, panicking if it is missing
    pub fn standard(name: &str) -> &'static ConnectorDescriptor {
        builtin_table()
            .and_then(|table| table.lookup(name))
            .unwrap_or_else(|e| panic!("standard connector missing: {}", e))
    }

    /// Verifies a descriptor matches its frozen contract
    pub fn verify_connector_contract(contract: &ConnectorContract) {
        let descriptor = standard(contract.name);
        assert_eq!(
            descriptor.from.kind.to_string(),
            contract.from,
            "{}: from kind changed",
            contract.name
        );
        assert_eq!(
            descriptor.to.kind.to_string(),
            contract.to,
            "{}: to kind changed",
            contract.name
        );
        assert_eq!(
            descriptor.from.threads, contract.from_threads,
            "{}: from threads changed",
            contract.name
        );
        assert_eq!(
            descriptor.to.threads, contract.to_threads,
            "{}: to threads changed",
            contract.name
        );
        assert_eq!(
            descriptor.type_checking, contract.type_checking,
            "{}: type checking changed",
            contract.name
        );
        assert_eq!(
            descriptor.hardware_format, contract.hardware,
            "{}: hardware format changed",
            contract.name
        );
        assert_eq!(
            descriptor.effective_policy().to_string(),
            contract.policy,
            "{}: access policy changed",
            contract.name
        );
        let primitive = match &descriptor.realization {
            connectors::Realization::NativeBuiltin => None,
            connectors::Realization::ComposedFromPrimitive { primitive } => Some(primitive.as_str()),
        };
        assert_eq!(
            primitive, contract.composed_from,
            "{}: realization changed",
            contract.name
        );
    }
}

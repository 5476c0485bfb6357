//! Build resolution
//!
//! A build either resolves completely or fails with every problem found.

use crate::validate::{self_validate, validate, BoundEndpoint, Connection};
use crate::ValidationError;
use connectors::{builtin_table, CatalogError, ConnectorTable};
use core_types::{base_kind, BuildId, Endpoint};
use formal_verification::{
    find_resource_conflict, run_builtin_verification, run_table_verification, ResourceClaim,
    VerificationReport,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{info, warn};

/// One endpoint as written in a build description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDeclaration {
    pub component: String,
    pub interface: String,
    /// Kind name, singular or plural spelling
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl EndpointDeclaration {
    pub fn new(component: &str, interface: &str, kind: &str) -> Self {
        Self {
            component: component.to_string(),
            interface: interface.to_string(),
            kind: kind.to_string(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, attribute: &str) -> Self {
        self.attribute = Some(attribute.to_string());
        self
    }

    pub fn resolve(&self) -> Result<Endpoint, ValidationError> {
        let endpoint = Endpoint::new(&self.component, &self.interface, base_kind(&self.kind)?);
        Ok(match &self.attribute {
            Some(attribute) => endpoint.with_attribute(attribute.as_str()),
            None => endpoint,
        })
    }
}

/// One connection as written in a build description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDeclaration {
    pub instance: String,
    pub connector: String,
    #[serde(default)]
    pub from: Vec<EndpointDeclaration>,
    #[serde(default)]
    pub to: Vec<EndpointDeclaration>,
}

/// Parsed build description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDescription {
    pub connections: Vec<ConnectionDeclaration>,
}

impl BuildDescription {
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json).map_err(|e| ValidationError::Description(e.to_string()))
    }
}

/// A rejected connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionFailure {
    pub instance: String,
    pub error: ValidationError,
}

/// Every failure of a rejected build
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{build} rejected: {} connection(s) failed", .failures.len())]
pub struct BuildFailure {
    pub build: BuildId,
    pub failures: Vec<ConnectionFailure>,
}

impl BuildFailure {
    /// The failure recorded for `instance`, if any
    pub fn failure(&self, instance: &str) -> Option<&ValidationError> {
        self.failures
            .iter()
            .find(|failure| failure.instance == instance)
            .map(|failure| &failure.error)
    }
}

/// All connections of one successful build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedBuild {
    pub build: BuildId,
    pub connections: Vec<Connection>,
}

impl ResolvedBuild {
    pub fn connection(&self, instance: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.instance == instance)
    }

    /// Components that receive no generated code
    pub fn fictitious_components(&self) -> BTreeSet<&str> {
        self.connections
            .iter()
            .flat_map(Connection::fictitious_components)
            .collect()
    }

    pub fn resource_claims(&self) -> Vec<ResourceClaim> {
        self.connections
            .iter()
            .flat_map(Connection::resource_claims)
            .collect()
    }

    /// Hardware endpoints with their normalized resources
    pub fn hardware_resources(&self) -> impl Iterator<Item = &BoundEndpoint> {
        self.connections
            .iter()
            .flat_map(|c| c.from.iter().chain(c.to.iter()))
            .filter(|bound| bound.is_fictitious())
    }

    pub fn to_json(&self) -> Result<String, ValidationError> {
        serde_json::to_string_pretty(self).map_err(|e| ValidationError::Description(e.to_string()))
    }
}

/// Resolves connections against a frozen table
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'t> {
    table: &'t ConnectorTable,
}

impl<'t> Resolver<'t> {
    /// Creates a resolver after checking the table
    ///
    /// Every descriptor must pass the table invariants and connect a
    /// synthetic one-to-one arrangement.
    pub fn new(table: &'t ConnectorTable) -> Result<Self, CatalogError> {
        Self::checked(table, run_table_verification(table))
    }

    pub fn table(&self) -> &'t ConnectorTable {
        self.table
    }

    /// Validates one declared connection
    pub fn validate_declaration(
        &self,
        declaration: &ConnectionDeclaration,
    ) -> Result<Connection, ValidationError> {
        let descriptor = self.table.lookup(&declaration.connector)?;
        let from = resolve_all(&declaration.from)?;
        let to = resolve_all(&declaration.to)?;
        validate(descriptor, &declaration.instance, &from, &to)
    }

    /// Resolves a whole build
    ///
    /// Fails if any connection fails; the failure lists every problem found.
    pub fn resolve_build(&self, description: &BuildDescription) -> Result<ResolvedBuild, BuildFailure> {
        let build = BuildId::new();
        let mut instances = BTreeSet::new();
        let mut connections = Vec::new();
        let mut claims: Vec<ResourceClaim> = Vec::new();
        let mut failures = Vec::new();

        for declaration in &description.connections {
            let result = if instances.insert(declaration.instance.as_str()) {
                self.validate_declaration(declaration)
                    .and_then(|connection| claim_resources(&mut claims, connection))
            } else {
                Err(ValidationError::DuplicateInstance(declaration.instance.clone()))
            };

            match result {
                Ok(connection) => connections.push(connection),
                Err(error) => {
                    warn!(%build, instance = %declaration.instance, %error, "connection rejected");
                    failures.push(ConnectionFailure {
                        instance: declaration.instance.clone(),
                        error,
                    });
                }
            }
        }

        if !failures.is_empty() {
            return Err(BuildFailure { build, failures });
        }

        info!(
            %build,
            connections = connections.len(),
            hardware_claims = claims.len(),
            "build resolved"
        );
        Ok(ResolvedBuild { build, connections })
    }

    fn checked(table: &'t ConnectorTable, report: VerificationReport) -> Result<Self, CatalogError> {
        report
            .into_result()
            .map_err(|e| CatalogError::Verification(e.to_string()))?;
        for descriptor in table.iter() {
            self_validate(descriptor).map_err(|e| CatalogError::InvalidDescriptor {
                name: descriptor.name.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(Self { table })
    }
}

impl Resolver<'static> {
    /// Resolver over the process-wide standard table
    pub fn builtin() -> Result<Self, CatalogError> {
        let table = builtin_table()?;
        Self::checked(table, run_builtin_verification(table))
    }
}

fn resolve_all(declarations: &[EndpointDeclaration]) -> Result<Vec<Endpoint>, ValidationError> {
    declarations.iter().map(EndpointDeclaration::resolve).collect()
}

/// Adds the connection's claims unless they overlap an accepted one
fn claim_resources(
    claims: &mut Vec<ResourceClaim>,
    connection: Connection,
) -> Result<Connection, ValidationError> {
    let mut candidate = claims.clone();
    candidate.extend(connection.resource_claims());
    if let Some((held, new)) = find_resource_conflict(&candidate) {
        return Err(ValidationError::ResourceConflict(format!(
            "{} ({}) overlaps {} ({}) bound by {}",
            new.owner, new.resource, held.owner, held.resource, held.connection
        )));
    }
    *claims = candidate;
    Ok(connection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::{ConnectorDescriptor, ConnectorTableBuilder, EndpointSpec};
    use hardware::HardwareResource;

    fn rpc(instance: &str, client: &str) -> ConnectionDeclaration {
        ConnectionDeclaration {
            instance: instance.to_string(),
            connector: "seL4RPCCall".to_string(),
            from: vec![EndpointDeclaration::new(client, "api", "Procedure")],
            to: vec![EndpointDeclaration::new("server", "api", "Procedure")],
        }
    }

    fn mmio(instance: &str, device: &str, attribute: &str) -> ConnectionDeclaration {
        ConnectionDeclaration {
            instance: instance.to_string(),
            connector: "seL4HardwareMMIO".to_string(),
            from: vec![EndpointDeclaration::new("driver", device, "Dataport")],
            to: vec![EndpointDeclaration::new(device, "regs", "Dataport").with_attribute(attribute)],
        }
    }

    #[test]
    fn test_builtin_resolver() {
        let resolver = Resolver::builtin().unwrap();
        assert_eq!(resolver.table().len(), connectors::BUILTIN_COUNT);
    }

    #[test]
    fn test_resolve_build() {
        let resolver = Resolver::builtin().unwrap();
        let description = BuildDescription {
            connections: vec![rpc("a", "client"), mmio("uart", "uart_hw", "0x1000:0x1000")],
        };
        let resolved = resolver.resolve_build(&description).unwrap();
        assert_eq!(resolved.connections.len(), 2);
        assert!(resolved.connection("uart").is_some());
        assert_eq!(
            resolved.fictitious_components().into_iter().collect::<Vec<_>>(),
            vec!["uart_hw"]
        );
        let resources: Vec<_> = resolved
            .hardware_resources()
            .filter_map(|bound| bound.resource.clone())
            .collect();
        assert_eq!(
            resources,
            vec![HardwareResource::Mmio {
                paddr: 0x1000,
                size: 0x1000
            }]
        );
    }

    #[test]
    fn test_build_is_all_or_nothing() {
        let resolver = Resolver::builtin().unwrap();
        let mut broken = rpc("b", "client_b");
        broken.to.clear();
        let description = BuildDescription {
            connections: vec![rpc("a", "client_a"), broken, rpc("a", "client_c")],
        };
        let failure = resolver.resolve_build(&description).unwrap_err();
        assert_eq!(failure.failures.len(), 2);
        assert!(matches!(
            failure.failure("b"),
            Some(ValidationError::Cardinality { .. })
        ));
        assert_eq!(
            failure.failure("a"),
            Some(&ValidationError::DuplicateInstance("a".to_string()))
        );
    }

    #[test]
    fn test_overlapping_mmio_rejected() {
        let resolver = Resolver::builtin().unwrap();
        let description = BuildDescription {
            connections: vec![
                mmio("uart", "uart_hw", "0x1000:0x1000"),
                mmio("timer", "timer_hw", "0x1800:0x100"),
            ],
        };
        let failure = resolver.resolve_build(&description).unwrap_err();
        assert_eq!(failure.failures.len(), 1);
        assert_eq!(failure.failures[0].instance, "timer");
        assert!(matches!(
            failure.failures[0].error,
            ValidationError::ResourceConflict(_)
        ));
    }

    #[test]
    fn test_hardware_endpoint_is_fixed_across_connections() {
        let resolver = Resolver::builtin().unwrap();
        let description = BuildDescription {
            connections: vec![
                mmio("regs_a", "uart_hw", "0x1000:0x1000"),
                mmio("regs_b", "uart_hw", "0x80000:0x10"),
            ],
        };
        let failure = resolver.resolve_build(&description).unwrap_err();
        assert_eq!(failure.failures.len(), 1);
        assert!(matches!(
            failure.failure("regs_b"),
            Some(ValidationError::ResourceConflict(_))
        ));

        let repeated = BuildDescription {
            connections: vec![
                mmio("regs_a", "uart_hw", "0x1000:0x1000"),
                mmio("regs_b", "uart_hw", "0x1000:0x1000"),
            ],
        };
        assert!(resolver.resolve_build(&repeated).is_ok());
    }

    #[test]
    fn test_unknown_connector_and_kind() {
        let resolver = Resolver::builtin().unwrap();
        let mut unknown = rpc("x", "client");
        unknown.connector = "seL4Teleport".to_string();
        assert_eq!(
            resolver.validate_declaration(&unknown),
            Err(ValidationError::UnknownConnector("seL4Teleport".to_string()))
        );

        let mut bad_kind = rpc("y", "client");
        bad_kind.from[0].kind = "Mailbox".to_string();
        assert!(matches!(
            resolver.validate_declaration(&bad_kind),
            Err(ValidationError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_description_from_json() {
        let json = r#"{
            "connections": [{
                "instance": "irq",
                "connector": "seL4HardwareInterrupt",
                "from": [{"component": "uart_hw", "interface": "irq", "kind": "Event", "attribute": "0x2A"}],
                "to": [{"component": "driver", "interface": "irq", "kind": "Event"}]
            }]
        }"#;
        let description = BuildDescription::from_json(json).unwrap();
        let resolved = Resolver::builtin()
            .unwrap()
            .resolve_build(&description)
            .unwrap();
        assert_eq!(
            resolved.connection("irq").unwrap().from[0].resource,
            Some(HardwareResource::Interrupt { irq: 42 })
        );
        assert!(resolved.to_json().unwrap().contains("\"irq\": 42"));
        assert!(matches!(
            BuildDescription::from_json("{"),
            Err(ValidationError::Description(_))
        ));
    }

    #[test]
    fn test_custom_table_resolver() {
        let mut builder = ConnectorTableBuilder::new();
        builder
            .register(ConnectorDescriptor::new(
                "Mailbox",
                EndpointSpec::parse("Events").unwrap().with_threads(0),
                EndpointSpec::parse("Event").unwrap().with_threads(1),
            ))
            .unwrap();
        let table = builder.freeze();
        let resolver = Resolver::new(&table).unwrap();
        let declaration = ConnectionDeclaration {
            instance: "mb".to_string(),
            connector: "Mailbox".to_string(),
            from: vec![EndpointDeclaration::new("a", "out", "Events")],
            to: vec![EndpointDeclaration::new("b", "in", "Event")],
        };
        let connection = resolver.validate_declaration(&declaration).unwrap();
        assert!(connection.threading.coalescing);
        // Builtins are absent from a custom table.
        assert!(resolver.validate_declaration(&rpc("c", "client")).is_err());
    }
}

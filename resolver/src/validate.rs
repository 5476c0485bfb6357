//! Connection validation and hardware specialization

use crate::threading::ThreadingContract;
use crate::ValidationError;
use connectors::{ConnectorDescriptor, Realization};
use core_types::{Endpoint, EndpointRole};
use formal_verification::ResourceClaim;
use hardware::{HardwareError, HardwareResource};
use policy::AccessPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// An endpoint after validation
///
/// `resource` is set exactly when the endpoint sits on the connector's
/// hardware side; such an endpoint's component is fictitious.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundEndpoint {
    pub endpoint: Endpoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<HardwareResource>,
}

impl BoundEndpoint {
    pub fn is_fictitious(&self) -> bool {
        self.resource.is_some()
    }
}

/// A validated connection, consumed read-only by the generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub instance: String,
    pub connector: String,
    pub realization: Realization,
    pub from: Vec<BoundEndpoint>,
    pub to: Vec<BoundEndpoint>,
    pub threading: ThreadingContract,
    pub policy: AccessPolicy,
    pub type_checked: bool,
}

impl Connection {
    pub fn endpoints(&self, role: EndpointRole) -> &[BoundEndpoint] {
        match role {
            EndpointRole::From => &self.from,
            EndpointRole::To => &self.to,
        }
    }

    /// Components that receive no generated code
    pub fn fictitious_components(&self) -> BTreeSet<&str> {
        self.from
            .iter()
            .chain(self.to.iter())
            .filter(|bound| bound.is_fictitious())
            .map(|bound| bound.endpoint.component.as_str())
            .collect()
    }

    /// Hardware resources claimed by this connection's fictitious endpoints
    pub fn resource_claims(&self) -> Vec<ResourceClaim> {
        [EndpointRole::From, EndpointRole::To]
            .into_iter()
            .flat_map(|role| {
                self.endpoints(role).iter().filter_map(move |bound| {
                    bound.resource.clone().map(|resource| ResourceClaim {
                        connection: self.instance.clone(),
                        owner: bound.endpoint.qualified_name(),
                        role,
                        resource,
                    })
                })
            })
            .collect()
    }
}

/// Validates one connection against its connector
///
/// Checks cardinality, endpoint shapes and hardware attributes, and derives
/// the threading contract of both sides.
pub fn validate(
    descriptor: &ConnectorDescriptor,
    instance: &str,
    from: &[Endpoint],
    to: &[Endpoint],
) -> Result<Connection, ValidationError> {
    check_cardinality(descriptor, EndpointRole::From, from)?;
    check_cardinality(descriptor, EndpointRole::To, to)?;

    let from = bind_side(descriptor, instance, EndpointRole::From, from)?;
    let to = bind_side(descriptor, instance, EndpointRole::To, to)?;

    let connection = Connection {
        instance: instance.to_string(),
        connector: descriptor.name.clone(),
        realization: descriptor.realization.clone(),
        from,
        to,
        threading: ThreadingContract::for_descriptor(descriptor),
        policy: descriptor.effective_policy(),
        type_checked: descriptor.type_checking,
    };
    debug!(
        instance,
        connector = %descriptor.name,
        from = connection.from.len(),
        to = connection.to.len(),
        "validated connection"
    );
    Ok(connection)
}

/// Applies the hardware rule to one endpoint
///
/// Returns the parsed resource when `role` is the connector's hardware side,
/// `None` otherwise.
pub fn specialize(
    endpoint: &Endpoint,
    descriptor: &ConnectorDescriptor,
    role: EndpointRole,
) -> Result<Option<HardwareResource>, ValidationError> {
    if descriptor.hardware_role() != Some(role) {
        return Ok(None);
    }
    let format = descriptor
        .hardware_format
        .ok_or_else(|| ValidationError::InvalidDescriptor {
            name: descriptor.name.clone(),
            reason: format!("hardware {} side has no attribute format", role),
        })?;

    let attribute = endpoint
        .attribute
        .as_deref()
        .ok_or(HardwareError::MissingAttribute { format })
        .map_err(|source| ValidationError::MalformedHardwareAttribute {
            endpoint: endpoint.qualified_name(),
            source,
        })?;

    format
        .parse(attribute)
        .map(Some)
        .map_err(|source| ValidationError::MalformedHardwareAttribute {
            endpoint: endpoint.qualified_name(),
            source,
        })
}

/// Validates a synthetic one-to-one connection over `descriptor`
///
/// Hardware sides receive the format's sample attribute. A descriptor that
/// cannot connect even this simplest arrangement is unusable.
pub fn self_validate(descriptor: &ConnectorDescriptor) -> Result<Connection, ValidationError> {
    let synthetic = |role: EndpointRole| {
        let endpoint = Endpoint::new(
            format!("{}_{}", descriptor.name, role),
            "self_check",
            descriptor.spec(role).kind.base,
        );
        match descriptor.hardware_format {
            Some(format) if descriptor.hardware_role() == Some(role) => {
                endpoint.with_attribute(format.sample_attribute())
            }
            _ => endpoint,
        }
    };
    validate(
        descriptor,
        &format!("{}_self_check", descriptor.name),
        &[synthetic(EndpointRole::From)],
        &[synthetic(EndpointRole::To)],
    )
}

fn check_cardinality(
    descriptor: &ConnectorDescriptor,
    role: EndpointRole,
    endpoints: &[Endpoint],
) -> Result<(), ValidationError> {
    let cardinality = descriptor.spec(role).kind.cardinality;
    if !cardinality.accepts(endpoints.len()) {
        return Err(ValidationError::Cardinality {
            connector: descriptor.name.clone(),
            role,
            reason: format!("expected {}, found {}", cardinality, endpoints.len()),
        });
    }

    for (i, endpoint) in endpoints.iter().enumerate() {
        if endpoints[..i].iter().any(|other| other.same_interface(endpoint)) {
            return Err(ValidationError::Cardinality {
                connector: descriptor.name.clone(),
                role,
                reason: format!("{} is bound more than once", endpoint.qualified_name()),
            });
        }
    }
    Ok(())
}

fn bind_side(
    descriptor: &ConnectorDescriptor,
    instance: &str,
    role: EndpointRole,
    endpoints: &[Endpoint],
) -> Result<Vec<BoundEndpoint>, ValidationError> {
    let expected = descriptor.spec(role).kind.base;
    let hardware_side = descriptor.hardware_role() == Some(role);

    endpoints
        .iter()
        .map(|endpoint| {
            if endpoint.kind != expected {
                if descriptor.type_checking {
                    return Err(ValidationError::KindMismatch {
                        connector: descriptor.name.clone(),
                        endpoint: endpoint.qualified_name(),
                        role,
                        expected,
                        found: endpoint.kind,
                    });
                }
                warn!(
                    instance,
                    connector = %descriptor.name,
                    endpoint = %endpoint.qualified_name(),
                    %expected,
                    found = %endpoint.kind,
                    "type checking disabled; accepting mismatched endpoint"
                );
            }

            if !hardware_side && endpoint.attribute.is_some() {
                warn!(
                    instance,
                    endpoint = %endpoint.qualified_name(),
                    "ignoring attribute on non-hardware endpoint"
                );
            }

            Ok(BoundEndpoint {
                endpoint: endpoint.clone(),
                resource: specialize(endpoint, descriptor, role)?,
            })
        })
        .collect()
}

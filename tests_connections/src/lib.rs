//! Connection Test Utilities
//!
//! This crate provides shared utilities for end-to-end connection tests.
//!
//! ## Test Philosophy
//!
//! - **Whole pipeline**: tests go through the resolver, not around it
//! - **Fail closed**: every malformed declaration must be rejected
//! - **No partial builds**: one bad connection rejects the build

use connectors::ConnectorDescriptor;
use core_types::{BaseKind, Endpoint, EndpointRole};
use resolver::{ConnectionDeclaration, EndpointDeclaration, Resolver};

/// Resolver over the standard connectors
pub fn standard_resolver() -> Resolver<'static> {
    Resolver::builtin().expect("standard connectors must load")
}

/// Declares a connection with one endpoint per listed component
pub fn declare(
    instance: &str,
    connector: &str,
    from: &[(&str, &str)],
    to: &[(&str, &str)],
) -> ConnectionDeclaration {
    let side = |endpoints: &[(&str, &str)]| -> Vec<EndpointDeclaration> {
        endpoints
            .iter()
            .map(|(component, kind)| EndpointDeclaration::new(component, "iface", kind))
            .collect()
    };
    ConnectionDeclaration {
        instance: instance.to_string(),
        connector: connector.to_string(),
        from: side(from),
        to: side(to),
    }
}

/// `count` distinct endpoints of the shape a connector side expects
///
/// Hardware sides get the format's sample attribute.
pub fn endpoints_for(
    descriptor: &ConnectorDescriptor,
    role: EndpointRole,
    count: usize,
) -> Vec<Endpoint> {
    let kind: BaseKind = descriptor.spec(role).kind.base;
    (0..count)
        .map(|i| {
            let endpoint = Endpoint::new(format!("{}_{}", role, i), "iface", kind);
            match descriptor.hardware_format {
                Some(format) if descriptor.hardware_role() == Some(role) => {
                    endpoint.with_attribute(format.sample_attribute())
                }
                _ => endpoint,
            }
        })
        .collect()
}

//! Invariant checks over connector tables and hardware resource claims.

use connectors::{ConnectorTable, BUILTIN_COUNT};
use core_types::EndpointRole;
use hardware::HardwareResource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub name: String,
    pub passed: bool,
    pub details: Option<String>,
}

impl VerificationResult {
    pub fn pass(name: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            details: None,
        }
    }

    pub fn fail(name: &str, details: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            details: Some(details.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub results: Vec<VerificationResult>,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &VerificationResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    pub fn push(&mut self, result: VerificationResult) {
        self.results.push(result);
    }

    /// Converts the first failure into an error
    pub fn into_result(self) -> Result<(), VerificationError> {
        match self.results.into_iter().find(|r| !r.passed) {
            None => Ok(()),
            Some(failure) => Err(VerificationError::Failed(format!(
                "{}: {}",
                failure.name,
                failure.details.unwrap_or_default()
            ))),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Invariant failed: {0}")]
    Failed(String),
}

/// Connector invariant: every descriptor passes its own structural checks.
pub fn verify_descriptor_invariants(table: &ConnectorTable) -> VerificationResult {
    for descriptor in table.iter() {
        if let Err(e) = descriptor.check() {
            return VerificationResult::fail("connector.descriptor_invariants", e.to_string());
        }
    }
    VerificationResult::pass("connector.descriptor_invariants")
}

/// Connector invariant: hardware endpoints never face hardware endpoints.
pub fn verify_hardware_exclusivity(table: &ConnectorTable) -> VerificationResult {
    for descriptor in table.iter() {
        if descriptor.from.kind.hardware && descriptor.to.kind.hardware {
            return VerificationResult::fail(
                "connector.hardware_exclusive",
                format!("{} has hardware on both sides", descriptor.name),
            );
        }
    }
    VerificationResult::pass("connector.hardware_exclusive")
}

/// Connector invariant: the hardware side of a connector is singular and unthreaded.
pub fn verify_hardware_sides(table: &ConnectorTable) -> VerificationResult {
    for descriptor in table.iter() {
        let Some(role) = descriptor.hardware_role() else {
            continue;
        };
        let spec = descriptor.spec(role);
        if spec.kind.is_plural() || spec.threads.unwrap_or(0) > 0 {
            return VerificationResult::fail(
                "connector.hardware_side",
                format!("{} has a plural or threaded {} hardware side", descriptor.name, role),
            );
        }
    }
    VerificationResult::pass("connector.hardware_side")
}

/// The standard set must be complete.
pub fn verify_builtin_set(table: &ConnectorTable) -> VerificationResult {
    let builtins = match connectors::builtin_descriptors() {
        Ok(builtins) => builtins,
        Err(e) => return VerificationResult::fail("connector.builtin_set", e.to_string()),
    };
    let missing: Vec<_> = builtins
        .iter()
        .filter(|d| !table.contains(&d.name))
        .map(|d| d.name.as_str())
        .collect();
    if !missing.is_empty() || builtins.len() != BUILTIN_COUNT {
        return VerificationResult::fail(
            "connector.builtin_set",
            format!("missing standard connectors: {}", missing.join(", ")),
        );
    }
    VerificationResult::pass("connector.builtin_set")
}

/// A hardware resource claimed by one fictitious endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceClaim {
    /// Connection instance that binds the endpoint
    pub connection: String,
    /// `component.interface` of the hardware endpoint
    pub owner: String,
    pub role: EndpointRole,
    pub resource: HardwareResource,
}

/// Resource invariant: distinct hardware endpoints claim disjoint hardware.
///
/// One endpoint connected several times must describe the same resource
/// every time; repeating an identical claim is not a conflict.
pub fn verify_resource_claims(claims: &[ResourceClaim]) -> VerificationResult {
    match find_resource_conflict(claims) {
        Some((a, b)) => VerificationResult::fail(
            "hardware.disjoint_claims",
            format!(
                "{} ({}) conflicts with {} ({})",
                a.owner, a.resource, b.owner, b.resource
            ),
        ),
        None => VerificationResult::pass("hardware.disjoint_claims"),
    }
}

/// Returns the first pair of conflicting claims.
///
/// Distinct endpoints conflict when their resources overlap. One endpoint
/// conflicts with itself when two claims describe different resources.
pub fn find_resource_conflict(claims: &[ResourceClaim]) -> Option<(&ResourceClaim, &ResourceClaim)> {
    for (i, a) in claims.iter().enumerate() {
        for b in claims.iter().skip(i + 1) {
            let conflict = if a.owner == b.owner {
                a.resource != b.resource
            } else {
                a.resource.conflicts_with(&b.resource)
            };
            if conflict {
                return Some((a, b));
            }
        }
    }
    None
}

/// Runs every table invariant.
pub fn run_table_verification(table: &ConnectorTable) -> VerificationReport {
    VerificationReport {
        results: vec![
            verify_descriptor_invariants(table),
            verify_hardware_exclusivity(table),
            verify_hardware_sides(table),
        ],
    }
}

/// Runs table invariants and requires the standard set to be present.
pub fn run_builtin_verification(table: &ConnectorTable) -> VerificationReport {
    let mut report = run_table_verification(table);
    report.push(verify_builtin_set(table));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::{builtin_table, ConnectorTableBuilder};

    #[test]
    fn test_builtin_table_verifies() {
        let report = run_builtin_verification(builtin_table().unwrap());
        assert!(report.passed(), "{:?}", report);
        assert_eq!(report.results.len(), 4);
    }

    #[test]
    fn test_empty_table_misses_builtins() {
        let table = ConnectorTableBuilder::new().freeze();
        assert!(run_table_verification(&table).passed());

        let report = run_builtin_verification(&table);
        assert!(!report.passed());
        assert_eq!(report.failures().count(), 1);
        assert!(matches!(
            report.into_result(),
            Err(VerificationError::Failed(msg)) if msg.starts_with("connector.builtin_set")
        ));
    }

    #[test]
    fn test_resource_claims_detect_overlap() {
        let claims = vec![
            ResourceClaim {
                connection: "uart_mmio".to_string(),
                owner: "uart.regs".to_string(),
                role: EndpointRole::To,
                resource: HardwareResource::Mmio {
                    paddr: 0x1000,
                    size: 0x1000,
                },
            },
            ResourceClaim {
                connection: "timer_mmio".to_string(),
                owner: "timer.regs".to_string(),
                role: EndpointRole::To,
                resource: HardwareResource::Mmio {
                    paddr: 0x1800,
                    size: 0x100,
                },
            },
        ];
        assert!(!verify_resource_claims(&claims).passed);
    }

    #[test]
    fn test_same_owner_may_repeat_claim() {
        let claim = ResourceClaim {
            connection: "uart_irq".to_string(),
            owner: "uart.irq".to_string(),
            role: EndpointRole::From,
            resource: HardwareResource::Interrupt { irq: 33 },
        };
        assert!(verify_resource_claims(&[claim.clone(), claim.clone()]).passed);

        let other = ResourceClaim {
            owner: "timer.irq".to_string(),
            ..claim.clone()
        };
        let claims = [claim, other];
        assert!(!verify_resource_claims(&claims).passed);
        let (a, b) = find_resource_conflict(&claims).unwrap();
        assert_eq!((a.owner.as_str(), b.owner.as_str()), ("uart.irq", "timer.irq"));
    }

    #[test]
    fn test_endpoint_cannot_claim_two_resources() {
        let first = ResourceClaim {
            connection: "regs_a".to_string(),
            owner: "uart.regs".to_string(),
            role: EndpointRole::To,
            resource: HardwareResource::Mmio {
                paddr: 0x1000,
                size: 0x1000,
            },
        };
        let second = ResourceClaim {
            connection: "regs_b".to_string(),
            resource: HardwareResource::Mmio {
                paddr: 0x80000,
                size: 0x10,
            },
            ..first.clone()
        };
        let claims = [first, second];
        assert!(!verify_resource_claims(&claims).passed);
        let (a, b) = find_resource_conflict(&claims).unwrap();
        assert_eq!((a.connection.as_str(), b.connection.as_str()), ("regs_a", "regs_b"));
    }

    #[test]
    fn test_report_into_result() {
        let report = VerificationReport {
            results: vec![VerificationResult::pass("a"), VerificationResult::pass("b")],
        };
        assert_eq!(report.into_result(), Ok(()));
    }
}

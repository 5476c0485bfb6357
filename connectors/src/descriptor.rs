//! Connector descriptors
//!
//! A descriptor is the static definition of one connector: the interface
//! shape each side must have, how many execution contexts the generated glue
//! gets on each side, whether endpoint shapes are type checked, which
//! hardware attribute format applies, and the access policy it confers.

use crate::CatalogError;
use core_types::{BaseKind, EndpointRole, InterfaceKind};
use hardware::HardwareFormat;
use policy::AccessPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape and thread budget of one connector side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointSpec {
    pub kind: InterfaceKind,
    /// Dedicated execution contexts for this side's glue
    ///
    /// `None` leaves the choice to the generator; `Some(0)` means the glue
    /// runs on whatever thread calls into it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<u32>,
}

impl EndpointSpec {
    pub fn new(kind: InterfaceKind) -> Self {
        Self {
            kind,
            threads: None,
        }
    }

    /// Parses the kind from its textual form
    pub fn parse(kind: &str) -> Result<Self, CatalogError> {
        Ok(Self::new(InterfaceKind::parse(kind)?))
    }

    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = Some(threads);
        self
    }
}

impl fmt::Display for EndpointSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.threads {
            Some(threads) => write!(f, "{} with {} threads", self.kind, threads),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// How a connector is backed
///
/// Both variants are resolved identically; the tag only tells the generator
/// whether a kernel mechanism implements the pattern directly or the pattern
/// is layered on another primitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Realization {
    #[default]
    NativeBuiltin,
    ComposedFromPrimitive { primitive: String },
}

fn default_type_checking() -> bool {
    true
}

/// Static definition of a connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorDescriptor {
    pub name: String,
    pub from: EndpointSpec,
    pub to: EndpointSpec,
    #[serde(default = "default_type_checking")]
    pub type_checking: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_format: Option<HardwareFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<AccessPolicy>,
    #[serde(default)]
    pub realization: Realization,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl ConnectorDescriptor {
    /// Creates a natively-backed, type-checked descriptor
    pub fn new(name: impl Into<String>, from: EndpointSpec, to: EndpointSpec) -> Self {
        Self {
            name: name.into(),
            from,
            to,
            type_checking: true,
            hardware_format: None,
            policy: None,
            realization: Realization::NativeBuiltin,
            description: String::new(),
        }
    }

    /// Relaxes endpoint shape matching
    pub fn without_type_checking(mut self) -> Self {
        self.type_checking = false;
        self
    }

    pub fn with_hardware_format(mut self, format: HardwareFormat) -> Self {
        self.hardware_format = Some(format);
        self
    }

    pub fn with_policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Parses and attaches an access relation
    pub fn attach_policy(self, relation: &str) -> Result<Self, CatalogError> {
        let policy = AccessPolicy::parse(relation).map_err(|e| CatalogError::InvalidDescriptor {
            name: self.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(self.with_policy(policy))
    }

    /// Marks the connector as layered on another primitive
    pub fn composed_from(mut self, primitive: impl Into<String>) -> Self {
        self.realization = Realization::ComposedFromPrimitive {
            primitive: primitive.into(),
        };
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the endpoint spec for one side
    pub fn spec(&self, role: EndpointRole) -> &EndpointSpec {
        match role {
            EndpointRole::From => &self.from,
            EndpointRole::To => &self.to,
        }
    }

    /// Returns the side marked `hardware`, if any
    pub fn hardware_role(&self) -> Option<EndpointRole> {
        if self.from.kind.hardware {
            Some(EndpointRole::From)
        } else if self.to.kind.hardware {
            Some(EndpointRole::To)
        } else {
            None
        }
    }

    /// Whether a kernel mechanism backs this connector directly
    pub fn is_builtin(&self) -> bool {
        matches!(self.realization, Realization::NativeBuiltin)
    }

    /// Whether the sender side delivers without waiting for the receiver
    pub fn delivers_asynchronously(&self) -> bool {
        self.from.kind.base == BaseKind::Event
    }

    /// The effective access policy (empty when none is attached)
    pub fn effective_policy(&self) -> AccessPolicy {
        self.policy.unwrap_or_else(AccessPolicy::empty)
    }

    /// Checks the descriptor's structural invariants
    pub fn check(&self) -> Result<(), CatalogError> {
        let invalid = |reason: String| CatalogError::InvalidDescriptor {
            name: self.name.clone(),
            reason,
        };

        if !is_identifier(&self.name) {
            return Err(invalid("name is not an identifier".to_string()));
        }
        if self.from.kind.hardware && self.to.kind.hardware {
            return Err(invalid(
                "hardware endpoints cannot connect to hardware endpoints".to_string(),
            ));
        }
        if let Realization::ComposedFromPrimitive { primitive } = &self.realization {
            if primitive.trim().is_empty() {
                return Err(invalid("composed connector names no primitive".to_string()));
            }
        }

        match (self.hardware_role(), self.hardware_format) {
            (None, None) => Ok(()),
            (None, Some(format)) => Err(invalid(format!(
                "{} attribute format given but no side is hardware",
                format
            ))),
            (Some(role), None) => Err(invalid(format!(
                "hardware {} side has no attribute format",
                role
            ))),
            (Some(role), Some(format)) => {
                let spec = self.spec(role);
                if spec.kind.is_plural() {
                    return Err(invalid(format!("hardware {} side must be singular", role)));
                }
                if matches!(spec.threads, Some(threads) if threads > 0) {
                    return Err(invalid(format!(
                        "hardware {} side cannot have dedicated threads",
                        role
                    )));
                }
                if spec.kind.base != format.expected_kind() {
                    return Err(invalid(format!(
                        "{} attribute format requires a {} hardware side, found {}",
                        format,
                        format.expected_kind(),
                        spec.kind.base
                    )));
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ConnectorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connector {} {{ from {}; to {}; }}", self.name, self.from, self.to)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

//! Concrete connection endpoints

use crate::kind::BaseKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a connection an endpoint sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointRole {
    From,
    To,
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointRole::From => write!(f, "from"),
            EndpointRole::To => write!(f, "to"),
        }
    }
}

/// One concrete interface of one component instance
///
/// `attribute` carries the out-of-band hardware description for endpoints
/// bound on a hardware side; it is ignored elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub component: String,
    pub interface: String,
    pub kind: BaseKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Endpoint {
    /// Creates an endpoint without an attribute
    pub fn new(component: impl Into<String>, interface: impl Into<String>, kind: BaseKind) -> Self {
        Self {
            component: component.into(),
            interface: interface.into(),
            kind,
            attribute: None,
        }
    }

    /// Attaches a hardware attribute string
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Returns `component.interface`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.component, self.interface)
    }

    /// Two endpoints name the same interface regardless of declared kind
    pub fn same_interface(&self, other: &Endpoint) -> bool {
        self.component == other.component && self.interface == other.interface
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} ({})", self.component, self.interface, self.kind)
    }
}

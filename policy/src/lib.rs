//! # Access Policy Annotations
//!
//! This crate describes which directions of capability flow a connector
//! confers between its two sides and the kernel objects backing it.
//!
//! ## Philosophy
//!
//! - **Policy observes; it does not own**: the annotation is carried, never
//!   evaluated, by the connector model
//! - **Structured, not stringly-typed**: six named predicates instead of an
//!   opaque relation string, so consumers need no second parser
//! - **Empty means default**: an empty annotation confers nothing beyond the
//!   default capability transfer on connect
//!
//! ## Relation Text
//!
//! ```text
//! relation := "none" | "" | flow ("," flow)*
//! flow     := party "->" target
//! party    := "from" | "to"
//! target   := "from" | "to" | "conn"
//! ```
//!
//! ```
//! use policy::AccessPolicy;
//!
//! let policy = AccessPolicy::parse("from -> to, to -> conn").unwrap();
//! assert!(policy.from_to);
//! assert!(policy.to_conn);
//! assert_eq!(policy.to_string(), "from->to, to->conn");
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A connection side that can hold capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessParty {
    From,
    To,
}

/// Something a capability can confer access to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTarget {
    From,
    To,
    /// The kernel object(s) backing the connection itself
    Conn,
}

impl AccessParty {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "from" => Some(Self::From),
            "to" => Some(Self::To),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::From => "from",
            Self::To => "to",
        }
    }
}

impl AccessTarget {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "from" => Some(Self::From),
            "to" => Some(Self::To),
            "conn" => Some(Self::Conn),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::From => "from",
            Self::To => "to",
            Self::Conn => "conn",
        }
    }
}

/// One direction of capability flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessFlow {
    pub party: AccessParty,
    pub target: AccessTarget,
}

impl fmt::Display for AccessFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.party.as_str(), self.target.as_str())
    }
}

/// Errors in relation text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// A term is not of the form `party -> target`
    MalformedTerm(String),
    /// A party or target word is not recognized
    UnknownParty(String),
    /// The same flow appears more than once
    DuplicateFlow(String),
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedTerm(term) => write!(f, "Malformed access term '{}'", term),
            Self::UnknownParty(word) => write!(f, "Unknown access party '{}'", word),
            Self::DuplicateFlow(flow) => write!(f, "Duplicate access flow '{}'", flow),
        }
    }
}

impl core::error::Error for PolicyError {}

/// The access relation a connector confers by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessPolicy {
    #[serde(default)]
    pub from_to: bool,
    #[serde(default)]
    pub to_from: bool,
    #[serde(default)]
    pub from_from: bool,
    #[serde(default)]
    pub to_to: bool,
    #[serde(default)]
    pub from_conn: bool,
    #[serde(default)]
    pub to_conn: bool,
}

impl AccessPolicy {
    /// No policy beyond default capability transfer on connect
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses relation text (see the crate docs for the grammar)
    pub fn parse(text: &str) -> Result<Self, PolicyError> {
        let text = text.trim();
        let mut policy = Self::empty();
        if text.is_empty() || text == "none" {
            return Ok(policy);
        }

        for term in text.split(',') {
            let term = term.trim();
            let (party, target) = term
                .split_once("->")
                .ok_or_else(|| PolicyError::MalformedTerm(term.to_string()))?;
            let (party, target) = (party.trim(), target.trim());
            if party.is_empty() || target.is_empty() {
                return Err(PolicyError::MalformedTerm(term.to_string()));
            }
            let flow = AccessFlow {
                party: AccessParty::parse(party)
                    .ok_or_else(|| PolicyError::UnknownParty(party.to_string()))?,
                target: AccessTarget::parse(target)
                    .ok_or_else(|| PolicyError::UnknownParty(target.to_string()))?,
            };
            if policy.grants(flow) {
                return Err(PolicyError::DuplicateFlow(flow.to_string()));
            }
            policy.set(flow, true);
        }

        Ok(policy)
    }

    /// Adds a flow to the relation
    pub fn with_flow(mut self, party: AccessParty, target: AccessTarget) -> Self {
        self.set(AccessFlow { party, target }, true);
        self
    }

    /// Checks whether the relation contains a flow
    pub fn grants(&self, flow: AccessFlow) -> bool {
        *self.slot(flow)
    }

    pub fn is_empty(&self) -> bool {
        self.flows().is_empty()
    }

    /// Returns the flows in canonical order
    pub fn flows(&self) -> Vec<AccessFlow> {
        CANONICAL_ORDER
            .iter()
            .copied()
            .filter(|flow| self.grants(*flow))
            .collect()
    }

    fn set(&mut self, flow: AccessFlow, value: bool) {
        *self.slot_mut(flow) = value;
    }

    fn slot(&self, flow: AccessFlow) -> &bool {
        match (flow.party, flow.target) {
            (AccessParty::From, AccessTarget::To) => &self.from_to,
            (AccessParty::To, AccessTarget::From) => &self.to_from,
            (AccessParty::From, AccessTarget::From) => &self.from_from,
            (AccessParty::To, AccessTarget::To) => &self.to_to,
            (AccessParty::From, AccessTarget::Conn) => &self.from_conn,
            (AccessParty::To, AccessTarget::Conn) => &self.to_conn,
        }
    }

    fn slot_mut(&mut self, flow: AccessFlow) -> &mut bool {
        match (flow.party, flow.target) {
            (AccessParty::From, AccessTarget::To) => &mut self.from_to,
            (AccessParty::To, AccessTarget::From) => &mut self.to_from,
            (AccessParty::From, AccessTarget::From) => &mut self.from_from,
            (AccessParty::To, AccessTarget::To) => &mut self.to_to,
            (AccessParty::From, AccessTarget::Conn) => &mut self.from_conn,
            (AccessParty::To, AccessTarget::Conn) => &mut self.to_conn,
        }
    }
}

const CANONICAL_ORDER: [AccessFlow; 6] = [
    AccessFlow {
        party: AccessParty::From,
        target: AccessTarget::To,
    },
    AccessFlow {
        party: AccessParty::To,
        target: AccessTarget::From,
    },
    AccessFlow {
        party: AccessParty::From,
        target: AccessTarget::From,
    },
    AccessFlow {
        party: AccessParty::To,
        target: AccessTarget::To,
    },
    AccessFlow {
        party: AccessParty::From,
        target: AccessTarget::Conn,
    },
    AccessFlow {
        party: AccessParty::To,
        target: AccessTarget::Conn,
    },
];

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flows = self.flows();
        if flows.is_empty() {
            return write!(f, "none");
        }
        for (i, flow) in flows.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", flow)?;
        }
        Ok(())
    }
}

impl core::str::FromStr for AccessPolicy {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

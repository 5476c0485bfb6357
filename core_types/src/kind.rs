//! Interface kind registry
//!
//! Every interface a component exposes has one of three abstract shapes:
//! a synchronous call surface (`Procedure`), an asynchronous signal surface
//! (`Event`) or a shared-memory surface (`Dataport`). Connector definitions
//! refine a shape with a cardinality (`Procedure` vs `Procedures`) and an
//! optional `hardware` qualifier.
//!
//! ## Textual Form
//!
//! ```text
//! [hardware ]<Kind>[s]
//! ```
//!
//! ```
//! use core_types::{BaseKind, Cardinality, InterfaceKind};
//!
//! let kind = InterfaceKind::parse("hardware Dataport").unwrap();
//! assert_eq!(kind.base, BaseKind::Dataport);
//! assert_eq!(kind.cardinality, Cardinality::Singular);
//! assert!(kind.hardware);
//! assert_eq!(kind.to_string(), "hardware Dataport");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Qualifier keyword marking a hardware (fictitious) endpoint
pub const HARDWARE_QUALIFIER: &str = "hardware";

/// Abstract interface shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BaseKind {
    /// Synchronous call/return surface
    Procedure,
    /// Asynchronous signal surface
    Event,
    /// Shared-memory surface
    Dataport,
}

impl BaseKind {
    /// All registered shapes, in registry order
    pub const ALL: [BaseKind; 3] = [BaseKind::Procedure, BaseKind::Event, BaseKind::Dataport];

    /// Returns the registry definition for this shape
    pub fn definition(&self) -> &'static KindDefinition {
        match self {
            BaseKind::Procedure => &KIND_DEFINITIONS[0],
            BaseKind::Event => &KIND_DEFINITIONS[1],
            BaseKind::Dataport => &KIND_DEFINITIONS[2],
        }
    }
}

impl fmt::Display for BaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.definition().singular)
    }
}

/// Whether one or many concrete endpoints may bind on a side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// Exactly one endpoint
    Singular,
    /// One or more endpoints (fan-in / fan-out)
    Plural,
}

impl Cardinality {
    /// Checks whether `count` endpoints satisfy this cardinality
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Cardinality::Singular => count == 1,
            Cardinality::Plural => count >= 1,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Singular => write!(f, "exactly one endpoint"),
            Cardinality::Plural => write!(f, "at least one endpoint"),
        }
    }
}

/// A registered interface shape and its spellings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindDefinition {
    pub base: BaseKind,
    pub singular: &'static str,
    pub plural: &'static str,
    pub summary: &'static str,
}

/// The fixed set of interface shapes
pub static KIND_DEFINITIONS: [KindDefinition; 3] = [
    KindDefinition {
        base: BaseKind::Procedure,
        singular: "Procedure",
        plural: "Procedures",
        summary: "synchronous call surface",
    },
    KindDefinition {
        base: BaseKind::Event,
        singular: "Event",
        plural: "Events",
        summary: "asynchronous signal surface",
    },
    KindDefinition {
        base: BaseKind::Dataport,
        singular: "Dataport",
        plural: "Dataports",
        summary: "shared-memory surface",
    },
];

/// Errors raised by kind lookups
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KindError {
    /// The declared kind has no registered definition
    #[error("Unknown interface kind: '{0}'")]
    UnknownKind(String),
}

/// A canonical interface shape as used by connector definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InterfaceKind {
    pub base: BaseKind,
    pub cardinality: Cardinality,
    pub hardware: bool,
}

impl InterfaceKind {
    /// Singular, non-hardware kind
    pub fn singular(base: BaseKind) -> Self {
        Self {
            base,
            cardinality: Cardinality::Singular,
            hardware: false,
        }
    }

    /// Plural, non-hardware kind
    pub fn plural(base: BaseKind) -> Self {
        Self {
            base,
            cardinality: Cardinality::Plural,
            hardware: false,
        }
    }

    /// Singular hardware kind
    pub fn hardware(base: BaseKind) -> Self {
        Self {
            base,
            cardinality: Cardinality::Singular,
            hardware: true,
        }
    }

    /// Resolves a declaration (kind name, cardinality, hardware flag)
    ///
    /// The kind name may use either registered spelling; the explicit
    /// `cardinality` argument wins over the spelling.
    pub fn resolve(
        kind: &str,
        cardinality: Cardinality,
        hardware: bool,
    ) -> Result<Self, KindError> {
        let (base, _) = lookup_name(kind)?;
        Ok(Self {
            base,
            cardinality,
            hardware,
        })
    }

    /// Parses the textual form `[hardware ]<Kind>[s]`
    pub fn parse(text: &str) -> Result<Self, KindError> {
        let mut words = text.split_whitespace();
        let (hardware, name) = match (words.next(), words.next(), words.next()) {
            (Some(HARDWARE_QUALIFIER), Some(name), None) => (true, name),
            (Some(name), None, None) => (false, name),
            _ => return Err(KindError::UnknownKind(text.to_string())),
        };
        let (base, cardinality) =
            lookup_name(name).map_err(|_| KindError::UnknownKind(text.to_string()))?;
        Ok(Self {
            base,
            cardinality,
            hardware,
        })
    }

    pub fn is_plural(&self) -> bool {
        self.cardinality == Cardinality::Plural
    }
}

impl fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardware {
            write!(f, "{} ", HARDWARE_QUALIFIER)?;
        }
        let def = self.base.definition();
        match self.cardinality {
            Cardinality::Singular => write!(f, "{}", def.singular),
            Cardinality::Plural => write!(f, "{}", def.plural),
        }
    }
}

impl TryFrom<String> for InterfaceKind {
    type Error = KindError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InterfaceKind> for String {
    fn from(kind: InterfaceKind) -> Self {
        kind.to_string()
    }
}

/// Resolves a bare kind name (either spelling) to its shape
///
/// Endpoint declarations name the shape of a concrete interface; the
/// cardinality of a concrete interface is irrelevant.
pub fn base_kind(name: &str) -> Result<BaseKind, KindError> {
    lookup_name(name.trim()).map(|(base, _)| base)
}

fn lookup_name(name: &str) -> Result<(BaseKind, Cardinality), KindError> {
    KIND_DEFINITIONS
        .iter()
        .find_map(|def| {
            if def.singular == name {
                Some((def.base, Cardinality::Singular))
            } else if def.plural == name {
                Some((def.base, Cardinality::Plural))
            } else {
                None
            }
        })
        .ok_or_else(|| KindError::UnknownKind(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plural_kind() {
        let kind = InterfaceKind::parse("Procedures").unwrap();
        assert_eq!(kind, InterfaceKind::plural(BaseKind::Procedure));
    }

    #[test]
    fn test_parse_hardware_kind() {
        let kind = InterfaceKind::parse("hardware Event").unwrap();
        assert_eq!(kind, InterfaceKind::hardware(BaseKind::Event));
        assert_eq!(kind.to_string(), "hardware Event");
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        assert_eq!(
            InterfaceKind::parse("Mailbox"),
            Err(KindError::UnknownKind("Mailbox".to_string()))
        );
        assert!(InterfaceKind::parse("software Event").is_err());
        assert!(InterfaceKind::parse("hardware Event extra").is_err());
        assert!(InterfaceKind::parse("").is_err());
    }

    #[test]
    fn test_resolve_uses_explicit_cardinality() {
        let kind = InterfaceKind::resolve("Dataport", Cardinality::Plural, false).unwrap();
        assert_eq!(kind.to_string(), "Dataports");
        assert!(InterfaceKind::resolve("procedure", Cardinality::Singular, false).is_err());
    }

    #[test]
    fn test_base_kind_accepts_both_spellings() {
        assert_eq!(base_kind("Event").unwrap(), BaseKind::Event);
        assert_eq!(base_kind("Events").unwrap(), BaseKind::Event);
        assert!(base_kind("Signal").is_err());
    }

    #[test]
    fn test_cardinality_accepts() {
        assert!(Cardinality::Singular.accepts(1));
        assert!(!Cardinality::Singular.accepts(0));
        assert!(!Cardinality::Singular.accepts(2));
        assert!(Cardinality::Plural.accepts(1));
        assert!(Cardinality::Plural.accepts(5));
        assert!(!Cardinality::Plural.accepts(0));
    }

    #[test]
    fn test_kind_serializes_as_text() {
        let kind = InterfaceKind::hardware(BaseKind::Dataport);
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, "\"hardware Dataport\"");
        let back: InterfaceKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
        assert!(serde_json::from_str::<InterfaceKind>("\"Widgets\"").is_err());
    }
}

//! # Connectors
//!
//! This crate defines connector descriptors and the table that holds them.
//!
//! ## Philosophy
//!
//! - **Trusted, auditable base**: the standard connectors are fixed and the
//!   table is frozen before any connection is validated
//! - **Invariants at the door**: a descriptor that breaks its own rules is
//!   never registered
//! - **Configuration, not code**: extra connectors arrive as a JSON manifest
//!
//! ## Core Concepts
//!
//! - [`ConnectorDescriptor`]: static definition of one connector
//! - [`ConnectorTableBuilder`]: registration stage
//! - [`ConnectorTable`]: frozen, read-only lookup
//! - [`builtin_table`]: the process-wide standard set

pub mod builtins;
pub mod descriptor;
pub mod manifest;
pub mod table;

pub use builtins::{builtin_descriptors, BUILTIN_COUNT};
pub use descriptor::{ConnectorDescriptor, EndpointSpec, Realization};
pub use manifest::ConnectorManifest;
pub use table::{builtin_table, ConnectorTable, ConnectorTableBuilder};

use core_types::KindError;
use thiserror::Error;

/// Errors raised while building or querying a connector table
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error(transparent)]
    UnknownKind(#[from] KindError),

    #[error("Connector already registered: {0}")]
    DuplicateName(String),

    #[error("Invalid connector descriptor '{name}': {reason}")]
    InvalidDescriptor { name: String, reason: String },

    #[error("Unknown connector: {0}")]
    UnknownConnector(String),

    #[error("Invalid connector manifest: {0}")]
    Manifest(String),

    #[error("Connector table failed verification: {0}")]
    Verification(String),
}

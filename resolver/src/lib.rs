//! # Resolver
//!
//! This crate turns declared connections into validated [`Connection`]s.
//!
//! ## Philosophy
//!
//! - **Reject early**: a connection that cannot be realized is refused before
//!   any code is generated
//! - **Nothing partial**: a build resolves completely or not at all
//! - **Explicit contracts**: every connection carries its threading and
//!   access policy, so the generator never has to guess
//!
//! ## Core Concepts
//!
//! - [`validate`]: cardinality, kind and hardware checks for one connection
//! - [`ThreadingContract`]: what each side may assume about blocking
//! - [`Resolver`]: resolves whole build descriptions against a frozen table

pub mod build;
pub mod threading;
pub mod validate;

pub use build::{
    BuildDescription, BuildFailure, ConnectionDeclaration, ConnectionFailure, EndpointDeclaration,
    ResolvedBuild, Resolver,
};
pub use threading::{side_threading, BlockingContract, SideThreading, ThreadingContract};
pub use validate::{self_validate, specialize, validate, BoundEndpoint, Connection};

use connectors::CatalogError;
use core_types::{BaseKind, EndpointRole, KindError};
use hardware::HardwareError;
use thiserror::Error;

/// Errors raised while validating connections
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error(transparent)]
    UnknownKind(#[from] KindError),

    #[error("Unknown connector: {0}")]
    UnknownConnector(String),

    #[error("Cardinality violation on {role} side of {connector}: {reason}")]
    Cardinality {
        connector: String,
        role: EndpointRole,
        reason: String,
    },

    #[error("{connector} expects {expected} on its {role} side, but {endpoint} is {found}")]
    KindMismatch {
        connector: String,
        role: EndpointRole,
        endpoint: String,
        expected: BaseKind,
        found: BaseKind,
    },

    #[error("Malformed hardware attribute on {endpoint}: {source}")]
    MalformedHardwareAttribute {
        endpoint: String,
        #[source]
        source: HardwareError,
    },

    #[error("Connection instance declared twice: {0}")]
    DuplicateInstance(String),

    #[error("Hardware resource conflict: {0}")]
    ResourceConflict(String),

    #[error("Invalid connector descriptor '{name}': {reason}")]
    InvalidDescriptor { name: String, reason: String },

    #[error("Invalid build description: {0}")]
    Description(String),
}

impl From<CatalogError> for ValidationError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownConnector(name) => ValidationError::UnknownConnector(name),
            CatalogError::UnknownKind(kind) => ValidationError::UnknownKind(kind),
            CatalogError::InvalidDescriptor { name, reason } => {
                ValidationError::InvalidDescriptor { name, reason }
            }
            other => ValidationError::InvalidDescriptor {
                name: String::new(),
                reason: other.to_string(),
            },
        }
    }
}

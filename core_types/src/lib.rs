//! # Core Types
//!
//! This crate defines the fundamental types shared by the connector model.
//!
//! ## Philosophy
//!
//! - **Shapes are a closed set**: Procedure, Event and Dataport, nothing else
//! - **Explicit over implicit**: cardinality and the hardware qualifier are
//!   part of the type, not conventions on names
//! - **Build-scoped**: nothing here lives past a single build invocation
//!
//! ## Key Types
//!
//! - [`InterfaceKind`]: shape + cardinality + hardware qualifier
//! - [`Endpoint`]: a concrete `component.interface` binding
//! - [`BuildId`]: identifier of one build invocation

pub mod endpoint;
pub mod ids;
pub mod kind;

pub use endpoint::{Endpoint, EndpointRole};
pub use ids::BuildId;
pub use kind::{
    base_kind, BaseKind, Cardinality, InterfaceKind, KindDefinition, KindError,
    HARDWARE_QUALIFIER, KIND_DEFINITIONS,
};

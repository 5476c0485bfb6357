//! # Hardware Endpoints
//!
//! This crate reads the attributes that describe hardware (fictitious)
//! endpoints.
//!
//! ## Philosophy
//!
//! **A hardware endpoint is a resource grant, not a program.**
//!
//! No code is generated for a hardware endpoint. What crosses the boundary
//! to resource allocation is the parsed attribute: a register window, an
//! interrupt line, a port range or a device-tree node.
//!
//! ## Design Principles
//!
//! 1. **One format per connector**: the connector fixes how its attribute is read
//! 2. **Canonical text**: every parsed resource re-serializes to a stable string
//! 3. **Pluggable interrupt cells**: device-tree decoding is keyed by controller

pub mod attribute;
pub mod interrupts;

pub use attribute::{HardwareError, HardwareFormat, HardwareResource, DTB_INTERRUPTS_FLAG};
pub use interrupts::{
    ArmGicCells, DerivedInterrupt, InterruptCellConvention, InterruptConventions, SingleCell,
    Trigger, GIC_PPI_BASE, GIC_SPI_BASE,
};

//! Device-tree interrupt specifier conventions
//!
//! A device-tree node lists its interrupts as groups of cells whose meaning
//! depends on the interrupt controller the node is wired to. Decoding is a
//! pluggable strategy keyed by the controller's `compatible` string, so a
//! platform with a different controller registers its own convention instead
//! of reinterpreting the GIC layout.

use crate::attribute::HardwareError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// First SPI line number on a GIC
pub const GIC_SPI_BASE: u32 = 32;
/// First PPI line number on a GIC
pub const GIC_PPI_BASE: u32 = 16;

/// Trigger mode of an interrupt line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    EdgeRising,
    EdgeFalling,
    LevelHigh,
    LevelLow,
}

/// An interrupt derived from a device-tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivedInterrupt {
    /// Kernel-visible interrupt line
    pub irq: u32,
    pub trigger: Trigger,
}

/// Decodes one interrupt specifier for a family of controllers
pub trait InterruptCellConvention: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &str;

    /// Number of cells per interrupt specifier
    fn cells(&self) -> usize;

    /// Decodes exactly `cells()` cells
    fn decode(&self, cells: &[u32]) -> Result<DerivedInterrupt, HardwareError>;

    /// Decodes a whole `interrupts` property
    fn decode_all(&self, property: &[u32]) -> Result<Vec<DerivedInterrupt>, HardwareError> {
        let width = self.cells();
        if width == 0 || property.len() % width != 0 {
            return Err(HardwareError::InvalidInterruptCells {
                convention: self.name().to_string(),
                reason: format!(
                    "{} cells is not a multiple of {}",
                    property.len(),
                    width
                ),
            });
        }
        property.chunks(width).map(|chunk| self.decode(chunk)).collect()
    }
}

/// Three-cell ARM GIC layout
///
/// Cell 1 is the SPI/PPI flag, cell 2 the interrupt number relative to its
/// class, cell 3 the trigger flags (low nibble).
pub struct ArmGicCells;

impl InterruptCellConvention for ArmGicCells {
    fn name(&self) -> &str {
        "arm-gic"
    }

    fn cells(&self) -> usize {
        3
    }

    fn decode(&self, cells: &[u32]) -> Result<DerivedInterrupt, HardwareError> {
        let invalid = |reason: String| HardwareError::InvalidInterruptCells {
            convention: self.name().to_string(),
            reason,
        };
        let [class, number, flags] = cells else {
            return Err(invalid(format!("expected 3 cells, got {}", cells.len())));
        };

        let base = match class {
            0 => GIC_SPI_BASE,
            1 => GIC_PPI_BASE,
            other => return Err(invalid(format!("unknown interrupt class {}", other))),
        };
        let irq = number
            .checked_add(base)
            .ok_or_else(|| invalid(format!("interrupt number {} overflows", number)))?;

        let trigger = match flags & 0xf {
            1 => Trigger::EdgeRising,
            2 => Trigger::EdgeFalling,
            4 => Trigger::LevelHigh,
            8 => Trigger::LevelLow,
            other => return Err(invalid(format!("unsupported trigger flags {:#x}", other))),
        };

        Ok(DerivedInterrupt { irq, trigger })
    }
}

/// One-cell layout: the cell is the interrupt line, level-triggered
pub struct SingleCell;

impl InterruptCellConvention for SingleCell {
    fn name(&self) -> &str {
        "single-cell"
    }

    fn cells(&self) -> usize {
        1
    }

    fn decode(&self, cells: &[u32]) -> Result<DerivedInterrupt, HardwareError> {
        match cells {
            [irq] => Ok(DerivedInterrupt {
                irq: *irq,
                trigger: Trigger::LevelHigh,
            }),
            _ => Err(HardwareError::InvalidInterruptCells {
                convention: self.name().to_string(),
                reason: format!("expected 1 cell, got {}", cells.len()),
            }),
        }
    }
}

/// Conventions keyed by interrupt-controller `compatible` string
///
/// Controllers without a registered convention fall back to the GIC layout.
pub struct InterruptConventions {
    by_compatible: BTreeMap<String, Box<dyn InterruptCellConvention>>,
    fallback: Box<dyn InterruptCellConvention>,
}

impl InterruptConventions {
    /// Creates a registry with the well-known controllers
    pub fn new() -> Self {
        let mut conventions = Self {
            by_compatible: BTreeMap::new(),
            fallback: Box::new(ArmGicCells),
        };
        for compatible in ["arm,gic-400", "arm,cortex-a15-gic", "arm,cortex-a9-gic", "arm,gic-v3"] {
            conventions.register(compatible, Box::new(ArmGicCells));
        }
        for compatible in ["riscv,plic0", "sifive,plic-1.0.0"] {
            conventions.register(compatible, Box::new(SingleCell));
        }
        conventions
    }

    /// Registers (or replaces) the convention for a controller
    pub fn register(
        &mut self,
        compatible: impl Into<String>,
        convention: Box<dyn InterruptCellConvention>,
    ) {
        self.by_compatible.insert(compatible.into(), convention);
    }

    /// Returns the convention for a controller
    pub fn for_controller(&self, compatible: &str) -> &dyn InterruptCellConvention {
        self.by_compatible
            .get(compatible)
            .map(|convention| &**convention)
            .unwrap_or(&*self.fallback)
    }

    /// Decodes a node's `interrupts` property for the given controller
    pub fn derive(
        &self,
        compatible: &str,
        property: &[u32],
    ) -> Result<Vec<DerivedInterrupt>, HardwareError> {
        self.for_controller(compatible).decode_all(property)
    }
}

impl Default for InterruptConventions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gic_spi_decodes_with_offset() {
        let irq = ArmGicCells.decode(&[0, 10, 4]).unwrap();
        assert_eq!(
            irq,
            DerivedInterrupt {
                irq: 42,
                trigger: Trigger::LevelHigh
            }
        );
    }

    #[test]
    fn test_gic_ppi_and_cpu_mask() {
        let irq = ArmGicCells.decode(&[1, 11, 0xf01]).unwrap();
        assert_eq!(irq.irq, 27);
        assert_eq!(irq.trigger, Trigger::EdgeRising);
    }

    #[test]
    fn test_gic_rejects_bad_cells() {
        assert!(ArmGicCells.decode(&[2, 10, 4]).is_err());
        assert!(ArmGicCells.decode(&[0, 10, 3]).is_err());
        assert!(ArmGicCells.decode(&[0, 10]).is_err());
    }

    #[test]
    fn test_decode_all_requires_whole_specifiers() {
        let irqs = ArmGicCells.decode_all(&[0, 1, 4, 0, 2, 1]).unwrap();
        assert_eq!(irqs.len(), 2);
        assert_eq!(irqs[1].irq, 34);

        let err = ArmGicCells.decode_all(&[0, 1, 4, 0]).unwrap_err();
        assert!(matches!(err, HardwareError::InvalidInterruptCells { .. }));
    }

    #[test]
    fn test_lookup_by_compatible() {
        let conventions = InterruptConventions::new();
        assert_eq!(conventions.for_controller("riscv,plic0").name(), "single-cell");
        assert_eq!(conventions.for_controller("arm,gic-400").name(), "arm-gic");
        assert_eq!(conventions.for_controller("vendor,unknown").name(), "arm-gic");

        let irqs = conventions.derive("riscv,plic0", &[5, 6]).unwrap();
        assert_eq!(irqs.iter().map(|i| i.irq).collect::<Vec<_>>(), vec![5, 6]);
    }

    #[test]
    fn test_register_overrides_convention() {
        let mut conventions = InterruptConventions::new();
        conventions.register("arm,gic-400", Box::new(SingleCell));
        assert_eq!(conventions.for_controller("arm,gic-400").cells(), 1);
    }
}

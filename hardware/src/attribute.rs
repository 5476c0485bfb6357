//! Hardware attribute formats
//!
//! A hardware endpoint stands for a physical device. The device is described
//! out-of-band by an attribute string whose format is fixed by the connector:
//!
//! | Format       | Text                          | Example              |
//! |--------------|-------------------------------|----------------------|
//! | `Mmio`       | `0x<addr>:0x<size>`           | `0x1000:0x200`       |
//! | `Interrupt`  | `<decimal>` or `0x<hex>`      | `42`, `0x2A`         |
//! | `IoPort`     | `0x<first>:0x<last>`          | `0x60:0x64`          |
//! | `DeviceTree` | `<path>[;interrupts]`         | `/soc/uart@9000000`  |

use core_types::BaseKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Suffix on a device-tree attribute requesting interrupt derivation
pub const DTB_INTERRUPTS_FLAG: &str = "interrupts";

/// Errors raised while reading hardware attributes
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HardwareError {
    /// A hardware endpoint carried no attribute at all
    #[error("Missing {format} attribute")]
    MissingAttribute { format: HardwareFormat },

    /// The attribute does not parse under the expected format
    #[error("Malformed {format} attribute '{attribute}': {reason}")]
    MalformedAttribute {
        format: HardwareFormat,
        attribute: String,
        reason: String,
    },

    /// Interrupt specifier cells do not fit the controller convention
    #[error("Invalid interrupt cells for {convention}: {reason}")]
    InvalidInterruptCells { convention: String, reason: String },
}

/// The attribute format a hardware connector expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareFormat {
    /// Memory-mapped register window
    Mmio,
    /// Interrupt line
    Interrupt,
    /// I/O port range
    IoPort,
    /// Device-tree node reference
    DeviceTree,
}

impl HardwareFormat {
    /// The interface shape a hardware endpoint of this format must have
    pub fn expected_kind(&self) -> BaseKind {
        match self {
            HardwareFormat::Mmio => BaseKind::Dataport,
            HardwareFormat::Interrupt => BaseKind::Event,
            HardwareFormat::IoPort => BaseKind::Procedure,
            HardwareFormat::DeviceTree => BaseKind::Dataport,
        }
    }

    /// A well-formed attribute, used by table self-checks
    pub fn sample_attribute(&self) -> &'static str {
        match self {
            HardwareFormat::Mmio => "0x1000:0x1000",
            HardwareFormat::Interrupt => "1",
            HardwareFormat::IoPort => "0x60:0x64",
            HardwareFormat::DeviceTree => "/soc/device@0",
        }
    }

    /// Parses `text` under this format
    pub fn parse(&self, text: &str) -> Result<HardwareResource, HardwareError> {
        let text = text.trim();
        let malformed = |reason: &str| HardwareError::MalformedAttribute {
            format: *self,
            attribute: text.to_string(),
            reason: reason.to_string(),
        };

        match self {
            HardwareFormat::Mmio => {
                let (addr, size) = text
                    .split_once(':')
                    .ok_or_else(|| malformed("expected 0x<address>:0x<size>"))?;
                let paddr = parse_hex(addr).ok_or_else(|| malformed("address is not 0x-hex"))?;
                let size = parse_hex(size).ok_or_else(|| malformed("size is not 0x-hex"))?;
                if size == 0 {
                    return Err(malformed("size must be non-zero"));
                }
                // The last byte must be addressable; the window may end at 2^64.
                if paddr.checked_add(size - 1).is_none() {
                    return Err(malformed("window exceeds the address space"));
                }
                Ok(HardwareResource::Mmio { paddr, size })
            }
            HardwareFormat::Interrupt => {
                let irq = parse_irq(text)
                    .ok_or_else(|| malformed("expected a decimal or 0x-hex interrupt number"))?;
                Ok(HardwareResource::Interrupt { irq })
            }
            HardwareFormat::IoPort => {
                let (first, last) = text
                    .split_once(':')
                    .ok_or_else(|| malformed("expected 0x<first_port>:0x<last_port>"))?;
                let first_port = parse_port(first)
                    .ok_or_else(|| malformed("first port is not a 16-bit 0x-hex value"))?;
                let last_port = parse_port(last)
                    .ok_or_else(|| malformed("last port is not a 16-bit 0x-hex value"))?;
                if first_port > last_port {
                    return Err(malformed("first port exceeds last port"));
                }
                Ok(HardwareResource::IoPort {
                    first_port,
                    last_port,
                })
            }
            HardwareFormat::DeviceTree => {
                let (path, generate_interrupts) = match text.split_once(';') {
                    Some((path, flag)) if flag.trim() == DTB_INTERRUPTS_FLAG => (path.trim(), true),
                    Some(_) => return Err(malformed("unknown device-tree flag")),
                    None => (text, false),
                };
                validate_dt_path(path).map_err(malformed)?;
                Ok(HardwareResource::DeviceTree {
                    path: path.to_string(),
                    generate_interrupts,
                })
            }
        }
    }
}

impl fmt::Display for HardwareFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareFormat::Mmio => write!(f, "MMIO"),
            HardwareFormat::Interrupt => write!(f, "interrupt"),
            HardwareFormat::IoPort => write!(f, "IO port"),
            HardwareFormat::DeviceTree => write!(f, "device-tree"),
        }
    }
}

/// A parsed hardware attribute, handed to resource allocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HardwareResource {
    Mmio { paddr: u64, size: u64 },
    Interrupt { irq: u32 },
    IoPort { first_port: u16, last_port: u16 },
    DeviceTree { path: String, generate_interrupts: bool },
}

impl HardwareResource {
    pub fn format(&self) -> HardwareFormat {
        match self {
            HardwareResource::Mmio { .. } => HardwareFormat::Mmio,
            HardwareResource::Interrupt { .. } => HardwareFormat::Interrupt,
            HardwareResource::IoPort { .. } => HardwareFormat::IoPort,
            HardwareResource::DeviceTree { .. } => HardwareFormat::DeviceTree,
        }
    }

    /// Checks whether two resources claim the same hardware
    ///
    /// Device-tree references only conflict when they name the same node.
    pub fn conflicts_with(&self, other: &HardwareResource) -> bool {
        match (self, other) {
            (
                HardwareResource::Mmio { paddr: a, size: a_len },
                HardwareResource::Mmio { paddr: b, size: b_len },
            ) => {
                if *a_len == 0 || *b_len == 0 {
                    return false;
                }
                let a_last = a.saturating_add(a_len - 1);
                let b_last = b.saturating_add(b_len - 1);
                a <= &b_last && b <= &a_last
            }
            (HardwareResource::Interrupt { irq: a }, HardwareResource::Interrupt { irq: b }) => {
                a == b
            }
            (
                HardwareResource::IoPort {
                    first_port: a_first,
                    last_port: a_last,
                },
                HardwareResource::IoPort {
                    first_port: b_first,
                    last_port: b_last,
                },
            ) => a_first <= b_last && b_first <= a_last,
            (
                HardwareResource::DeviceTree { path: a, .. },
                HardwareResource::DeviceTree { path: b, .. },
            ) => a == b,
            _ => false,
        }
    }
}

/// Renders the canonical attribute text
///
/// Hex is lowercase with a `0x` prefix and no padding; interrupts are
/// decimal. Parsing the rendered text yields the same resource, but only
/// input already in this form re-renders byte for byte.
impl fmt::Display for HardwareResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareResource::Mmio { paddr, size } => write!(f, "{:#x}:{:#x}", paddr, size),
            HardwareResource::Interrupt { irq } => write!(f, "{}", irq),
            HardwareResource::IoPort {
                first_port,
                last_port,
            } => write!(f, "{:#x}:{:#x}", first_port, last_port),
            HardwareResource::DeviceTree {
                path,
                generate_interrupts,
            } => {
                if *generate_interrupts {
                    write!(f, "{};{}", path, DTB_INTERRUPTS_FLAG)
                } else {
                    write!(f, "{}", path)
                }
            }
        }
    }
}

fn parse_hex(text: &str) -> Option<u64> {
    let digits = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

fn parse_port(text: &str) -> Option<u16> {
    parse_hex(text).and_then(|value| u16::try_from(value).ok())
}

fn parse_irq(text: &str) -> Option<u32> {
    if text.starts_with("0x") || text.starts_with("0X") {
        return parse_hex(text).and_then(|value| u32::try_from(value).ok());
    }
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn validate_dt_path(path: &str) -> Result<(), &'static str> {
    let rest = path
        .strip_prefix('/')
        .ok_or("device-tree path must be absolute")?;
    if rest.is_empty() {
        return Err("device-tree path must name a node below the root");
    }
    for segment in rest.split('/') {
        if segment.is_empty() {
            return Err("device-tree path has an empty segment");
        }
        let valid = segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ',' | '.' | '_' | '+' | '-' | '@'));
        if !valid {
            return Err("device-tree path has an invalid character");
        }
    }
    Ok(())
}

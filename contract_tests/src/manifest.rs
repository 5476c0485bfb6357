//! JSON boundary contract tests
//!
//! Field names and version numbers of the connector manifest and the build
//! description are stable. Changing them breaks external tooling.

use serde_json::Value;

// ===== Manifest Contract Version =====
pub const MANIFEST_VERSION: u32 = 1;

// ===== Field Identifiers =====
pub const DESCRIPTOR_FIELDS: [&str; 7] = [
    "name",
    "from",
    "to",
    "type_checking",
    "hardware_format",
    "policy",
    "realization",
];

/// Collects the keys of a JSON object
pub fn object_keys(value: &Value) -> Vec<&str> {
    value
        .as_object()
        .map(|object| object.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

// ===== Contract Tests =====

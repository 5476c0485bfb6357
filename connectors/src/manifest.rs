//! Connector manifests
//!
//! Connectors beyond the standard set are configuration, supplied as JSON:
//!
//! ```json
//! {
//!   "version": 1,
//!   "connectors": [
//!     { "name": "RPC", "from": { "kind": "Procedures", "threads": 0 }, "to": { "kind": "Procedure" } }
//!   ]
//! }
//! ```

use crate::descriptor::ConnectorDescriptor;
use crate::CatalogError;
use serde::{Deserialize, Serialize};

/// Serializable list of connector descriptors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorManifest {
    /// Version of the manifest format
    pub version: u32,
    #[serde(default)]
    pub connectors: Vec<ConnectorDescriptor>,
}

impl ConnectorManifest {
    /// Current version of the manifest format
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(connectors: Vec<ConnectorDescriptor>) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            connectors,
        }
    }

    /// Parses a manifest, rejecting unknown format versions
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let manifest: Self =
            serde_json::from_str(json).map_err(|e| CatalogError::Manifest(e.to_string()))?;
        if manifest.version != Self::CURRENT_VERSION {
            return Err(CatalogError::Manifest(format!(
                "unsupported manifest version {}",
                manifest.version
            )));
        }
        Ok(manifest)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        serde_json::to_string_pretty(self).map_err(|e| CatalogError::Manifest(e.to_string()))
    }
}

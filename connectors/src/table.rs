//! Connector descriptor table
//!
//! Registration happens on a [`ConnectorTableBuilder`]; freezing it yields an
//! immutable [`ConnectorTable`]. The process-wide table of standard
//! connectors is built exactly once and only read afterwards.

use crate::builtins::builtin_descriptors;
use crate::descriptor::ConnectorDescriptor;
use crate::manifest::ConnectorManifest;
use crate::CatalogError;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Mutable registration stage of a table
#[derive(Debug, Clone, Default)]
pub struct ConnectorTableBuilder {
    descriptors: BTreeMap<String, ConnectorDescriptor>,
}

impl ConnectorTableBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder holding the standard connectors
    pub fn with_builtins() -> Result<Self, CatalogError> {
        let mut builder = Self::new();
        for descriptor in builtin_descriptors()? {
            builder.register(descriptor)?;
        }
        Ok(builder)
    }

    /// Registers a new connector
    pub fn register(&mut self, descriptor: ConnectorDescriptor) -> Result<(), CatalogError> {
        if self.descriptors.contains_key(&descriptor.name) {
            return Err(CatalogError::DuplicateName(descriptor.name));
        }
        descriptor.check()?;
        debug!(connector = %descriptor.name, from = %descriptor.from, to = %descriptor.to, "registered connector");
        self.descriptors.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// Registers every connector in a JSON manifest
    ///
    /// Returns the number of connectors added. The manifest is applied
    /// whole: on failure the builder is left as it was.
    pub fn load_manifest(&mut self, json: &str) -> Result<usize, CatalogError> {
        let manifest = ConnectorManifest::from_json(json)?;
        let count = manifest.connectors.len();
        let mut staged = self.clone();
        for descriptor in manifest.connectors {
            staged.register(descriptor)?;
        }
        *self = staged;
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Freezes the table; no further registration is possible
    pub fn freeze(self) -> ConnectorTable {
        info!(connectors = self.descriptors.len(), "connector table frozen");
        ConnectorTable {
            descriptors: self.descriptors,
        }
    }
}

/// Immutable, name-ordered set of connector descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorTable {
    descriptors: BTreeMap<String, ConnectorDescriptor>,
}

impl ConnectorTable {
    /// Looks up a connector by name
    pub fn lookup(&self, name: &str) -> Result<&ConnectorDescriptor, CatalogError> {
        self.descriptors
            .get(name)
            .ok_or_else(|| CatalogError::UnknownConnector(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Connector names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectorDescriptor> {
        self.descriptors.values()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Exports the table as a manifest for documentation tooling
    pub fn to_manifest(&self) -> ConnectorManifest {
        ConnectorManifest::new(self.iter().cloned().collect())
    }
}

static BUILTIN_TABLE: OnceLock<Result<ConnectorTable, CatalogError>> = OnceLock::new();

/// The process-wide table of standard connectors
///
/// Built on first access. A failure here means the standard set itself is
/// broken and start-up must not continue.
pub fn builtin_table() -> Result<&'static ConnectorTable, CatalogError> {
    BUILTIN_TABLE
        .get_or_init(|| ConnectorTableBuilder::with_builtins().map(ConnectorTableBuilder::freeze))
        .as_ref()
        .map_err(Clone::clone)
}

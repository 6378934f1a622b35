//! Entity kinds and the dependencies a deferred registration waits for.

use crate::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The registry an entity lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    NodeType,
    DataType,
    ParameterType,
    SettingsSheet,
}

impl EntityKind {
    /// Returns the human-readable label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NodeType => "node type",
            Self::DataType => "data type",
            Self::ParameterType => "parameter type",
            Self::SettingsSheet => "settings sheet",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An entity that must already be registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dependency {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl Dependency {
    pub fn new(kind: EntityKind, id: EntityId) -> Self {
        Self { kind, id }
    }

    pub fn node_type(id: EntityId) -> Self {
        Self::new(EntityKind::NodeType, id)
    }

    pub fn data_type(id: EntityId) -> Self {
        Self::new(EntityKind::DataType, id)
    }

    pub fn parameter_type(id: EntityId) -> Self {
        Self::new(EntityKind::ParameterType, id)
    }

    pub fn settings_sheet(id: EntityId) -> Self {
        Self::new(EntityKind::SettingsSheet, id)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.id)
    }
}

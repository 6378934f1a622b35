//! Error types for registries and registration tasks.

use pipeforge_types::{EntityId, EntityKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The id is taken by a definition backed by a different type.
    #[error("{kind} '{id}' is already registered as {existing}; cannot register it as {attempted}")]
    Conflict {
        kind: EntityKind,
        id: EntityId,
        existing: &'static str,
        attempted: &'static str,
    },

    /// Another id already uses the same defining type.
    #[error("{kind} type {type_name} is already registered as '{existing}'; cannot register it as '{attempted}'")]
    DuplicateType {
        kind: EntityKind,
        type_name: &'static str,
        existing: EntityId,
        attempted: EntityId,
    },

    #[error("could not find {kind} with id '{id}'; known ids: [{known_ids}]", known_ids = .known.join(", "))]
    NotFound {
        kind: EntityKind,
        id: EntityId,
        known: Vec<String>,
    },

    #[error("registration task '{task}' failed: {message}")]
    TaskFailed { task: String, message: String },

    #[error(transparent)]
    Types(#[from] pipeforge_types::Error),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

//! Core type definitions for pipeforge.
//!
//! This crate defines the small, registry-agnostic vocabulary shared by the
//! other crates in the workspace:
//! - Namespaced entity identifiers (`"namespace:name"`)
//! - Source identifiers naming the extension that contributed an entity
//! - Type keys identifying the Rust type behind a definition
//! - Entity kinds and the dependencies registration tasks wait for

mod dependency;
mod ids;
mod type_key;

pub use dependency::{Dependency, EntityKind};
pub use ids::{EntityId, SourceId};
pub use type_key::TypeKey;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid entity id '{id}': {reason}")]
    InvalidId { id: String, reason: &'static str },

    #[error("invalid source id: {0}")]
    InvalidSource(String),
}

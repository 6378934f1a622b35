//! Error types for the extension host.

use pipeforge_convert::ConversionError;
use pipeforge_registry::RegistryError;
use pipeforge_types::SourceId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("extension '{0}' is blocked by the loader configuration")]
    ExtensionBlocked(SourceId),

    #[error("extension already loaded: {0}")]
    ExtensionAlreadyLoaded(SourceId),

    #[error("extension '{id}' failed to register: {message}")]
    ExtensionFailed { id: SourceId, message: String },

    #[error("invalid loader configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

//! Error types for conversions.

use pipeforge_registry::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("no conversion path from {from} to {to}")]
    NoPath { from: String, to: String },

    /// A converter chain produced a value of the wrong type.
    #[error("conversion to {expected} produced a value of type {actual}")]
    UnexpectedResult { expected: String, actual: String },

    /// Error raised by a converter, passed through unchanged.
    #[error(transparent)]
    Converter(#[from] anyhow::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

pub type ConversionResult<T> = Result<T, ConversionError>;

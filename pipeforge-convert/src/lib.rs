//! Data types and conversions for pipeforge.
//!
//! - [`Data`]: the trait every value flowing through a pipeline implements
//! - [`DataTypeInfo`]: registry definition of a data type, including its
//!   lineage (the chain of ancestor types it is assignable to)
//! - [`ConversionGraph`]: directed graph of "can become" edges, trivial
//!   (hierarchy) or explicit (a [`DataConverter`]), answering shortest-path
//!   conversion queries
//! - [`DatatypeRegistry`]: entity registry for data types that keeps the
//!   conversion graph in sync
//!
//! After loading, the graph is only read. It is `Send + Sync` and `convert`
//! may be called from many executor threads at once.

mod converter;
mod data;
mod error;
mod graph;
mod info;
mod registry;

pub use converter::{DataConverter, FnConverter};
pub use data::{AsAny, Data, DataValue, upcast_through};
pub use error::{ConversionError, ConversionResult};
pub use graph::{ConversionGraph, ConversionPath, ConversionStep, StepKind};
pub use info::DataTypeInfo;
pub use registry::DatatypeRegistry;

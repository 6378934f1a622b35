//! Extension host for pipeforge.
//!
//! Ties the registries, the registration scheduler and the conversion graph
//! together behind [`ExtensionHost`]. Extensions implement [`Extension`]
//! and register node types, data types, converters, parameter types and
//! settings sheets through the host, either directly or as registration
//! tasks that wait for their dependencies.
//!
//! Which extensions may load is controlled by a [`LoaderConfig`] read from
//! `pipeforge.toml`.

mod config;
mod error;
mod extension;
mod host;
mod node;
mod parameter;
mod registries;
mod settings;

pub use config::{CONFIG_FILE_NAME, ExtensionPolicyMode, LoaderConfig};
pub use error::{HostError, HostResult};
pub use extension::{Extension, ExtensionMetadata};
pub use host::{ExtensionHost, FailedExtension, HostEvent};
pub use node::{NodeRegistrationTask, NodeTypeInfo, ParameterSlot, SlotDirection, SlotInfo};
pub use parameter::ParameterTypeInfo;
pub use registries::{RegistrationSubscription, Registries};
pub use settings::SettingsSheetInfo;

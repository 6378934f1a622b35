//! Registries and deferred registration for pipeforge.
//!
//! - [`EntityRegistry`]: id → definition store with provenance and a
//!   reverse type index, one instance per entity kind
//! - [`ChangeNotifier`]: synchronous "entity registered" observer list
//! - [`TaskQueue`]: fixpoint scheduler for registrations that wait on
//!   other entities
//! - [`ValidityReport`]: structured diagnostics for pending tasks and
//!   invalid definitions
//!
//! Registries are additive during a session. The scheduler only terminates
//! because of that: a dependency that exists stays existing, so a task that
//! became eligible stays eligible.

mod entity;
mod error;
mod notifier;
mod registry;
mod report;
mod scheduler;
mod task;

pub use entity::EntityDefinition;
pub use error::{RegistryError, RegistryResult};
pub use notifier::{ChangeNotifier, RegistrationEvent, StateSignal, SubscriptionId};
pub use registry::{EntityRegistry, Registration};
pub use report::{ReportContext, ReportEntry, Severity, ValidityReport};
pub use scheduler::{FailedTask, PendingTask, TaskId, TaskQueue, TaskSnapshot};
pub use task::{DeferredRegistration, DependencyResolver, RegistrationTask};

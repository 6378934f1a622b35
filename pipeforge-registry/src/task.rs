//! Deferred registrations.

use crate::error::RegistryResult;
use pipeforge_types::Dependency;
use std::fmt;
use tracing::warn;

/// Answers whether a dependency is already registered somewhere.
///
/// Implemented by whatever owns the registries a task inspects.
pub trait DependencyResolver {
    fn is_satisfied(&self, dependency: &Dependency) -> bool;
}

/// A registration that waits until its dependencies exist.
///
/// # Monotonicity
///
/// [`can_register`](Self::can_register) must be monotonic: once it returned
/// `true` for some context state, it must keep returning `true` for every
/// later state. The default implementation only checks that dependencies are
/// registered, which is monotonic because registries never remove entries
/// during a session. The [`TaskQueue`](crate::TaskQueue) relies on this to
/// terminate and to guarantee that final registry contents do not depend on
/// submission order; a predicate that flips back to `false` may be skipped
/// for the rest of a pass.
pub trait RegistrationTask<C: DependencyResolver + ?Sized>: Send {
    /// Short label used in logs and reports.
    fn describe(&self) -> String;

    fn dependencies(&self) -> Vec<Dependency>;

    fn can_register(&self, ctx: &C) -> bool {
        self.dependencies().iter().all(|dep| ctx.is_satisfied(dep))
    }

    /// Performs the registration. Called at most once by the queue.
    fn register(&mut self, ctx: &mut C) -> RegistryResult<()>;

    fn missing_dependencies(&self, ctx: &C) -> Vec<Dependency> {
        self.dependencies()
            .into_iter()
            .filter(|dep| !ctx.is_satisfied(dep))
            .collect()
    }
}

type Action<C> = Box<dyn FnOnce(&mut C) -> RegistryResult<()> + Send>;

/// A task built from an explicit dependency list and a one-shot action.
pub struct DeferredRegistration<C: ?Sized> {
    description: String,
    dependencies: Vec<Dependency>,
    action: Option<Action<C>>,
}

impl<C: ?Sized> DeferredRegistration<C> {
    pub fn new<F>(description: impl Into<String>, dependencies: Vec<Dependency>, action: F) -> Self
    where
        F: FnOnce(&mut C) -> RegistryResult<()> + Send + 'static,
    {
        Self {
            description: description.into(),
            dependencies,
            action: Some(Box::new(action)),
        }
    }

    /// True once the action has run.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.action.is_none()
    }
}

impl<C: DependencyResolver + ?Sized> RegistrationTask<C> for DeferredRegistration<C> {
    fn describe(&self) -> String {
        self.description.clone()
    }

    fn dependencies(&self) -> Vec<Dependency> {
        self.dependencies.clone()
    }

    fn register(&mut self, ctx: &mut C) -> RegistryResult<()> {
        match self.action.take() {
            Some(action) => action(ctx),
            None => {
                warn!(task = %self.description, "Registration task fired twice; ignoring");
                Ok(())
            }
        }
    }
}

impl<C: ?Sized> fmt::Debug for DeferredRegistration<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredRegistration")
            .field("description", &self.description)
            .field("dependencies", &self.dependencies)
            .field("fired", &self.has_fired())
            .finish()
    }
}

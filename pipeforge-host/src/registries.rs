use crate::node::NodeTypeInfo;
use crate::parameter::ParameterTypeInfo;
use crate::settings::SettingsSheetInfo;
use pipeforge_convert::DatatypeRegistry;
use pipeforge_registry::{
    DependencyResolver, EntityRegistry, RegistrationEvent, StateSignal, SubscriptionId,
};
use pipeforge_types::{Dependency, EntityKind, SourceId};
use std::sync::Arc;

/// One registry per entity kind. This is the context registration tasks
/// run against.
#[derive(Debug, Default)]
pub struct Registries {
    pub nodes: EntityRegistry<NodeTypeInfo>,
    pub data_types: DatatypeRegistry,
    pub parameters: EntityRegistry<ParameterTypeInfo>,
    pub settings: EntityRegistry<SettingsSheetInfo>,
}

/// Subscription ids returned by [`Registries::subscribe_all`], one per
/// registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationSubscription {
    nodes: SubscriptionId,
    data_types: SubscriptionId,
    parameters: SubscriptionId,
    settings: SubscriptionId,
}

impl Registries {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises `signal` whenever any registry adds an entity.
    pub fn wire(&mut self, signal: &StateSignal) -> RegistrationSubscription {
        let signal = signal.clone();
        self.subscribe_all(move |_| signal.raise())
    }

    /// Subscribes one listener to every registry.
    pub fn subscribe_all<F>(&mut self, listener: F) -> RegistrationSubscription
    where
        F: Fn(&RegistrationEvent) + Send + Sync + 'static,
    {
        let listener = Arc::new(listener);
        let forward = |listener: &Arc<F>| {
            let listener = Arc::clone(listener);
            move |event: &RegistrationEvent| (*listener)(event)
        };
        RegistrationSubscription {
            nodes: self.nodes.subscribe(forward(&listener)),
            data_types: self.data_types.subscribe(forward(&listener)),
            parameters: self.parameters.subscribe(forward(&listener)),
            settings: self.settings.subscribe(forward(&listener)),
        }
    }

    pub fn unsubscribe_all(&mut self, subscription: RegistrationSubscription) {
        self.nodes.unsubscribe(subscription.nodes);
        self.data_types.unsubscribe(subscription.data_types);
        self.parameters.unsubscribe(subscription.parameters);
        self.settings.unsubscribe(subscription.settings);
    }

    /// The source that registered an entity of `kind` under `id`.
    #[must_use]
    pub fn source_of(&self, dependency: &Dependency) -> Option<&SourceId> {
        match dependency.kind {
            EntityKind::NodeType => self.nodes.get_source_of(&dependency.id),
            EntityKind::DataType => self.data_types.types().get_source_of(&dependency.id),
            EntityKind::ParameterType => self.parameters.get_source_of(&dependency.id),
            EntityKind::SettingsSheet => self.settings.get_source_of(&dependency.id),
        }
    }

    /// Total number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() + self.data_types.len() + self.parameters.len() + self.settings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears every registry. Subscriptions are kept.
    pub fn reset(&mut self) {
        self.nodes.reset();
        self.data_types.reset();
        self.parameters.reset();
        self.settings.reset();
    }
}

impl DependencyResolver for Registries {
    fn is_satisfied(&self, dependency: &Dependency) -> bool {
        match dependency.kind {
            EntityKind::NodeType => self.nodes.has(&dependency.id),
            EntityKind::DataType => self.data_types.has(&dependency.id),
            EntityKind::ParameterType => self.parameters.has(&dependency.id),
            EntityKind::SettingsSheet => self.settings.has(&dependency.id),
        }
    }
}

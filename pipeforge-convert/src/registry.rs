use crate::converter::DataConverter;
use crate::data::DataValue;
use crate::error::ConversionResult;
use crate::graph::{ConversionGraph, ConversionPath};
use crate::info::DataTypeInfo;
use pipeforge_registry::{
    EntityDefinition, EntityRegistry, Registration, RegistrationEvent, RegistryError, RegistryResult,
    SubscriptionId,
};
use pipeforge_types::{EntityId, EntityKind, SourceId};
use std::sync::Arc;
use tracing::debug;

/// Data type registry that keeps the conversion graph in sync.
///
/// Every data type gets a vertex when it is registered. Converters may be
/// registered before their endpoint types.
#[derive(Debug, Default)]
pub struct DatatypeRegistry {
    types: EntityRegistry<DataTypeInfo>,
    graph: ConversionGraph,
}

impl DatatypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a data type.
    ///
    /// Besides the id rules of [`EntityRegistry::register`], a Rust type can
    /// only be registered under one id; a second id for the same type is a
    /// [`RegistryError::DuplicateType`].
    pub fn register(&mut self, info: DataTypeInfo, source: &SourceId) -> RegistryResult<Registration> {
        if self.types.has(info.id()) {
            return self.types.register(info, source);
        }

        if let Some(existing) = self.types.id_of(info.key()) {
            return Err(RegistryError::DuplicateType {
                kind: EntityKind::DataType,
                type_name: info.key().name(),
                existing: existing.clone(),
                attempted: info.id().clone(),
            });
        }

        self.graph.register(info.clone());
        self.types.register(info, source)
    }

    pub fn register_converter(&mut self, converter: Arc<dyn DataConverter>) {
        debug!(
            input = %converter.input().id(),
            output = %converter.output().id(),
            "Registering converter"
        );
        self.graph.register_converter(converter);
    }

    #[must_use]
    pub fn types(&self) -> &EntityRegistry<DataTypeInfo> {
        &self.types
    }

    #[must_use]
    pub fn graph(&self) -> &ConversionGraph {
        &self.graph
    }

    pub fn info(&self, id: &EntityId) -> RegistryResult<&DataTypeInfo> {
        self.types.get(id)
    }

    #[must_use]
    pub fn has(&self, id: &EntityId) -> bool {
        self.types.has(id)
    }

    pub fn is_convertible(&self, from: &EntityId, to: &EntityId) -> ConversionResult<bool> {
        let (from, to) = (self.info(from)?, self.info(to)?);
        Ok(self.graph.is_convertible(from, to))
    }

    /// See [`ConversionGraph::conversion_distance`].
    pub fn conversion_distance(&self, from: &EntityId, to: &EntityId) -> ConversionResult<Option<usize>> {
        let (from, to) = (self.info(from)?, self.info(to)?);
        Ok(self.graph.conversion_distance(from, to))
    }

    pub fn shortest_path(&self, from: &EntityId, to: &EntityId) -> ConversionResult<Option<ConversionPath>> {
        let (from, to) = (self.info(from)?, self.info(to)?);
        Ok(self.graph.shortest_path(from, to))
    }

    /// Converts `value` into the data type registered as `to`.
    pub fn convert(&self, value: &DataValue, to: &EntityId) -> ConversionResult<DataValue> {
        let to = self.info(to)?;
        self.graph.convert(value, to)
    }

    pub fn visible(&self) -> impl Iterator<Item = &DataTypeInfo> {
        self.types.visible()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&RegistrationEvent) + Send + Sync + 'static,
    {
        self.types.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.types.unsubscribe(id)
    }

    /// Clears all types and converters. Subscriptions are kept.
    pub fn reset(&mut self) {
        self.types.reset();
        self.graph = ConversionGraph::new();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

//! Node type definitions and their deferred registration.

use crate::registries::Registries;
use pipeforge_registry::{EntityDefinition, RegistrationTask, RegistryResult};
use pipeforge_types::{Dependency, EntityId, EntityKind, SourceId, TypeKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotDirection {
    Input,
    Output,
}

impl SlotDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotDirection::Input => "input",
            SlotDirection::Output => "output",
        }
    }
}

/// A named input or output of a node, accepting one data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInfo {
    pub name: String,
    pub direction: SlotDirection,
    pub data_type: EntityId,
}

/// A named node parameter of a registered parameter type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSlot {
    pub key: String,
    pub parameter_type: EntityId,
}

/// Definition of a node type: what it is called, where it shows up, and
/// which data and parameter types it refers to.
#[derive(Debug, Clone)]
pub struct NodeTypeInfo {
    id: EntityId,
    name: String,
    description: String,
    category: String,
    type_key: TypeKey,
    slots: Vec<SlotInfo>,
    parameters: Vec<ParameterSlot>,
    hidden: bool,
}

impl NodeTypeInfo {
    /// `T` is the Rust type implementing the node.
    pub fn new<T: 'static>(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            category: String::new(),
            type_key: TypeKey::of::<T>(),
            slots: Vec::new(),
            parameters: Vec::new(),
            hidden: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_input(mut self, name: impl Into<String>, data_type: EntityId) -> Self {
        self.slots.push(SlotInfo {
            name: name.into(),
            direction: SlotDirection::Input,
            data_type,
        });
        self
    }

    pub fn with_output(mut self, name: impl Into<String>, data_type: EntityId) -> Self {
        self.slots.push(SlotInfo {
            name: name.into(),
            direction: SlotDirection::Output,
            data_type,
        });
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, parameter_type: EntityId) -> Self {
        self.parameters.push(ParameterSlot {
            key: key.into(),
            parameter_type,
        });
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn slots(&self) -> &[SlotInfo] {
        &self.slots
    }

    pub fn inputs(&self) -> impl Iterator<Item = &SlotInfo> {
        self.slots
            .iter()
            .filter(|slot| slot.direction == SlotDirection::Input)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &SlotInfo> {
        self.slots
            .iter()
            .filter(|slot| slot.direction == SlotDirection::Output)
    }

    #[must_use]
    pub fn parameters(&self) -> &[ParameterSlot] {
        &self.parameters
    }

    /// Every data type used by a slot and every parameter type, without
    /// duplicates, in sorted order.
    #[must_use]
    pub fn dependencies(&self) -> Vec<Dependency> {
        let data = self
            .slots
            .iter()
            .map(|slot| Dependency::data_type(slot.data_type.clone()));
        let parameters = self
            .parameters
            .iter()
            .map(|parameter| Dependency::parameter_type(parameter.parameter_type.clone()));
        data.chain(parameters)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl EntityDefinition for NodeTypeInfo {
    const KIND: EntityKind = EntityKind::NodeType;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn type_key(&self) -> TypeKey {
        self.type_key
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }
}

/// Registers a node type once the data and parameter types it refers to
/// exist, plus any extra dependencies added with
/// [`with_dependency`](Self::with_dependency).
#[derive(Debug)]
pub struct NodeRegistrationTask {
    node: Option<NodeTypeInfo>,
    id: EntityId,
    source: SourceId,
    dependencies: Vec<Dependency>,
}

impl NodeRegistrationTask {
    pub fn new(node: NodeTypeInfo, source: SourceId) -> Self {
        Self {
            id: node.id().clone(),
            dependencies: node.dependencies(),
            node: Some(node),
            source,
        }
    }

    /// Also waits for `dependency`, such as another node type.
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        if !self.dependencies.contains(&dependency) {
            self.dependencies.push(dependency);
        }
        self
    }

    #[must_use]
    pub fn node_id(&self) -> &EntityId {
        &self.id
    }
}

impl RegistrationTask<Registries> for NodeRegistrationTask {
    fn describe(&self) -> String {
        format!("node type '{}' from {}", self.id, self.source)
    }

    fn dependencies(&self) -> Vec<Dependency> {
        self.dependencies.clone()
    }

    fn register(&mut self, ctx: &mut Registries) -> RegistryResult<()> {
        let Some(node) = self.node.take() else {
            debug!(node_id = %self.id, "Node type already registered by this task");
            return Ok(());
        };
        ctx.nodes.register(node, &self.source)?;
        Ok(())
    }
}

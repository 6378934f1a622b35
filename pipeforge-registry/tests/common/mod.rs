#![allow(dead_code)]

use pipeforge_registry::{
    DeferredRegistration, DependencyResolver, EntityDefinition, EntityRegistry, RegistryResult,
    TaskQueue,
};
use pipeforge_types::{Dependency, EntityId, EntityKind, SourceId, TypeKey};

pub struct Threshold;
pub struct Blur;
pub struct Image;
pub struct Table;

#[derive(Debug, Clone)]
pub struct NodeDef {
    pub id: EntityId,
    pub type_key: TypeKey,
    pub category: String,
    pub hidden: bool,
}

impl NodeDef {
    pub fn new<T: 'static>(id: &str) -> Self {
        Self {
            id: eid(id),
            type_key: TypeKey::of::<T>(),
            category: "Filters".to_string(),
            hidden: false,
        }
    }

    pub fn in_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

impl EntityDefinition for NodeDef {
    const KIND: EntityKind = EntityKind::NodeType;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        self.id.name()
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

#[derive(Debug, Clone)]
pub struct DataDef {
    pub id: EntityId,
    pub type_key: TypeKey,
}

impl DataDef {
    pub fn new<T: 'static>(id: &str) -> Self {
        Self {
            id: eid(id),
            type_key: TypeKey::of::<T>(),
        }
    }
}

impl EntityDefinition for DataDef {
    const KIND: EntityKind = EntityKind::DataType;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        self.id.name()
    }

    fn category(&self) -> &str {
        "Data"
    }

    fn type_key(&self) -> TypeKey {
        self.type_key
    }
}

/// Two registries wired to a task queue, the way a host would do it.
#[derive(Default)]
pub struct Ctx {
    pub nodes: EntityRegistry<NodeDef>,
    pub data: EntityRegistry<DataDef>,
}

impl Ctx {
    pub fn wired(queue: &TaskQueue<Ctx>) -> Self {
        let mut ctx = Ctx::default();
        let signal = queue.signal();
        ctx.nodes.subscribe(move |_| signal.raise());
        let signal = queue.signal();
        ctx.data.subscribe(move |_| signal.raise());
        ctx
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.ids().map(ToString::to_string).collect()
    }

    pub fn data_ids(&self) -> Vec<String> {
        self.data.ids().map(ToString::to_string).collect()
    }
}

impl DependencyResolver for Ctx {
    fn is_satisfied(&self, dependency: &Dependency) -> bool {
        match dependency.kind {
            EntityKind::NodeType => self.nodes.has(&dependency.id),
            EntityKind::DataType => self.data.has(&dependency.id),
            _ => false,
        }
    }
}

pub fn eid(s: &str) -> EntityId {
    EntityId::parse(s).unwrap()
}

pub fn source(s: &str) -> SourceId {
    SourceId::new(s).unwrap()
}

pub fn data_dep(s: &str) -> Dependency {
    Dependency::data_type(eid(s))
}

pub fn node_dep(s: &str) -> Dependency {
    Dependency::node_type(eid(s))
}

/// A task registering `definition` into the node registry once `deps` exist.
pub fn node_task(definition: NodeDef, deps: Vec<Dependency>) -> DeferredRegistration<Ctx> {
    let description = format!("node {}", definition.id);
    DeferredRegistration::new(description, deps, move |ctx: &mut Ctx| -> RegistryResult<()> {
        ctx.nodes.register(definition, &source("ext.test"))?;
        Ok(())
    })
}

/// A task registering `definition` into the data registry once `deps` exist.
pub fn data_task(definition: DataDef, deps: Vec<Dependency>) -> DeferredRegistration<Ctx> {
    let description = format!("data {}", definition.id);
    DeferredRegistration::new(description, deps, move |ctx: &mut Ctx| -> RegistryResult<()> {
        ctx.data.register(definition, &source("ext.test"))?;
        Ok(())
    })
}

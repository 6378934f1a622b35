use pipeforge_registry::EntityDefinition;
use pipeforge_types::{EntityId, EntityKind, TypeKey};

/// A parameter type nodes can expose, such as a colour map or a file path.
#[derive(Debug, Clone)]
pub struct ParameterTypeInfo {
    id: EntityId,
    name: String,
    description: String,
    type_key: TypeKey,
    hidden: bool,
}

impl ParameterTypeInfo {
    /// `T` is the Rust type holding the parameter value.
    pub fn new<T: 'static>(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            type_key: TypeKey::of::<T>(),
            hidden: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
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
}

impl EntityDefinition for ParameterTypeInfo {
    const KIND: EntityKind = EntityKind::ParameterType;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> &str {
        "Parameters"
    }

    fn type_key(&self) -> TypeKey {
        self.type_key
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }
}

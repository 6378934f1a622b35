use pipeforge_registry::EntityDefinition;
use pipeforge_types::{EntityId, EntityKind, TypeKey};

/// A page of application settings contributed by an extension.
#[derive(Debug, Clone)]
pub struct SettingsSheetInfo {
    id: EntityId,
    name: String,
    category: String,
    description: String,
    type_key: TypeKey,
}

impl SettingsSheetInfo {
    /// `T` is the Rust type holding the sheet's values.
    pub fn new<T: 'static>(id: EntityId, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.into(),
            description: String::new(),
            type_key: TypeKey::of::<T>(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl EntityDefinition for SettingsSheetInfo {
    const KIND: EntityKind = EntityKind::SettingsSheet;

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
}

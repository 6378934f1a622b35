use crate::data::Data;
use pipeforge_registry::EntityDefinition;
use pipeforge_types::{EntityId, EntityKind, TypeKey};
use std::fmt;

/// Registry definition of a data type.
///
/// The lineage lists the type itself followed by its ancestors, nearest
/// first. Trivial convertibility is decided from the lineage alone, without
/// consulting the conversion graph.
#[derive(Debug, Clone)]
pub struct DataTypeInfo {
    id: EntityId,
    name: String,
    description: String,
    category: String,
    lineage: Vec<TypeKey>,
    hidden: bool,
}

impl DataTypeInfo {
    /// A type without ancestors.
    pub fn root<T: Data>(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            category: String::new(),
            lineage: vec![TypeKey::of::<T>()],
            hidden: false,
        }
    }

    /// A type deriving from `parent`.
    pub fn derived<T: Data>(id: EntityId, name: impl Into<String>, parent: &DataTypeInfo) -> Self {
        let mut lineage = Vec::with_capacity(parent.lineage.len() + 1);
        lineage.push(TypeKey::of::<T>());
        lineage.extend_from_slice(&parent.lineage);
        Self {
            id,
            name: name.into(),
            description: String::new(),
            category: parent.category.clone(),
            lineage,
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

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    #[must_use]
    pub fn key(&self) -> TypeKey {
        self.lineage[0]
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The type itself followed by its ancestors.
    #[must_use]
    pub fn lineage(&self) -> &[TypeKey] {
        &self.lineage
    }

    #[must_use]
    pub fn parent(&self) -> Option<TypeKey> {
        self.lineage.get(1).copied()
    }

    /// Number of hierarchy steps from this type up to `ancestor`.
    /// `Some(0)` for the type itself, `None` if `ancestor` is not in the lineage.
    #[must_use]
    pub fn hierarchy_distance(&self, ancestor: TypeKey) -> Option<usize> {
        self.lineage.iter().position(|key| *key == ancestor)
    }

    /// True if values of this type can be used where `ancestor` is expected.
    #[must_use]
    pub fn is_a(&self, ancestor: TypeKey) -> bool {
        self.lineage.contains(&ancestor)
    }

    /// `Name (namespace:id)`, used in error messages.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }
}

impl EntityDefinition for DataTypeInfo {
    const KIND: EntityKind = EntityKind::DataType;

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
        self.key()
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }
}

impl fmt::Display for DataTypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

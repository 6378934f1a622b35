use pipeforge_types::{EntityId, EntityKind, TypeKey};

/// A registrable definition: node type, data type, parameter type, settings
/// sheet.
///
/// Definitions are immutable once registered. Two definitions with the same
/// id are considered identical when their [`type_key`](Self::type_key)
/// matches.
pub trait EntityDefinition: Send + Sync {
    /// The registry kind this definition belongs to.
    const KIND: EntityKind;

    fn id(&self) -> &EntityId;

    /// Display name.
    fn name(&self) -> &str;

    /// Menu category / grouping tag.
    fn category(&self) -> &str;

    /// The Rust type that implements this entity.
    fn type_key(&self) -> TypeKey;

    /// Hidden entities are registered normally but left out of
    /// [`EntityRegistry::visible`](crate::EntityRegistry::visible).
    fn is_hidden(&self) -> bool {
        false
    }
}

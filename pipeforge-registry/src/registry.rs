//! Generic id → definition store with provenance.

use crate::entity::EntityDefinition;
use crate::error::{RegistryError, RegistryResult};
use crate::notifier::{ChangeNotifier, RegistrationEvent, SubscriptionId};
use pipeforge_types::{EntityId, EntityKind, SourceId, TypeKey};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Outcome of a successful [`EntityRegistry::register`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The definition was new and has been stored.
    Added,
    /// An identical definition (same id, same type) was already present.
    Unchanged,
}

/// Stores the definitions of one entity kind.
///
/// Iteration is ordered by id so listings and reports are reproducible.
/// There is no per-entity removal; [`reset`](Self::reset) clears everything.
pub struct EntityRegistry<D: EntityDefinition> {
    entries: BTreeMap<EntityId, D>,
    sources: HashMap<EntityId, SourceId>,
    /// Reverse index; the first id registered for a type wins.
    by_type: HashMap<TypeKey, EntityId>,
    notifier: ChangeNotifier<RegistrationEvent>,
}

impl<D: EntityDefinition> Default for EntityRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: EntityDefinition> EntityRegistry<D> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            sources: HashMap::new(),
            by_type: HashMap::new(),
            notifier: ChangeNotifier::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        D::KIND
    }

    /// Registers a definition on behalf of `source`.
    ///
    /// Registering an id a second time is a no-op when the defining type is
    /// the same and a [`RegistryError::Conflict`] otherwise.
    pub fn register(&mut self, definition: D, source: &SourceId) -> RegistryResult<Registration> {
        let id = definition.id().clone();
        if let Some(existing) = self.entries.get(&id) {
            if existing.type_key() == definition.type_key() {
                debug!(kind = %D::KIND, entity_id = %id, "Identical definition already registered");
                return Ok(Registration::Unchanged);
            }
            return Err(RegistryError::Conflict {
                kind: D::KIND,
                id,
                existing: existing.type_key().name(),
                attempted: definition.type_key().name(),
            });
        }

        self.by_type
            .entry(definition.type_key())
            .or_insert_with(|| id.clone());
        self.sources.insert(id.clone(), source.clone());
        self.entries.insert(id.clone(), definition);

        debug!(kind = %D::KIND, entity_id = %id, source = %source, "Registered");
        self.notifier.notify(&RegistrationEvent {
            kind: D::KIND,
            id,
            source: source.clone(),
        });
        Ok(Registration::Added)
    }

    /// Looks up a definition. The error lists every known id.
    pub fn get(&self, id: &EntityId) -> RegistryResult<&D> {
        self.entries.get(id).ok_or_else(|| RegistryError::NotFound {
            kind: D::KIND,
            id: id.clone(),
            known: self.entries.keys().map(ToString::to_string).collect(),
        })
    }

    #[must_use]
    pub fn has(&self, id: &EntityId) -> bool {
        self.entries.contains_key(id)
    }

    #[must_use]
    pub fn get_source_of(&self, id: &EntityId) -> Option<&SourceId> {
        self.sources.get(id)
    }

    /// All definitions registered by `source`, in id order.
    pub fn declared_by<'a>(&'a self, source: &'a SourceId) -> impl Iterator<Item = &'a D> + 'a {
        self.entries
            .iter()
            .filter(move |(id, _)| self.sources.get(*id) == Some(source))
            .map(|(_, definition)| definition)
    }

    /// Read-only view of every definition, keyed by id.
    #[must_use]
    pub fn all(&self) -> &BTreeMap<EntityId, D> {
        &self.entries
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entries.keys()
    }

    /// Definitions that are not flagged hidden.
    pub fn visible(&self) -> impl Iterator<Item = &D> {
        self.entries.values().filter(|definition| !definition.is_hidden())
    }

    /// Returns the id registered for a defining type.
    #[must_use]
    pub fn id_of(&self, type_key: TypeKey) -> Option<&EntityId> {
        self.by_type.get(&type_key)
    }

    /// Groups visible definitions by their category tag.
    #[must_use]
    pub fn by_category(&self) -> BTreeMap<&str, Vec<&D>> {
        let mut groups: BTreeMap<&str, Vec<&D>> = BTreeMap::new();
        for definition in self.visible() {
            groups.entry(definition.category()).or_default().push(definition);
        }
        groups
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every definition and its provenance. Subscriptions are kept.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.sources.clear();
        self.by_type.clear();
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&RegistrationEvent) + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    #[must_use]
    pub fn notifier(&self) -> &ChangeNotifier<RegistrationEvent> {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut ChangeNotifier<RegistrationEvent> {
        &mut self.notifier
    }
}

impl<D: EntityDefinition> std::fmt::Debug for EntityRegistry<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("kind", &D::KIND)
            .field("ids", &self.entries.keys().collect::<Vec<_>>())
            .field("notifier", &self.notifier)
            .finish()
    }
}

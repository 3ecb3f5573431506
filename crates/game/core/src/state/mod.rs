//! Authoritative battle state.
//!
//! Combatants live in a dense list indexed by [`EntityId`]. Spell casts and
//! effect instances are stored in id-keyed arenas so that entities, casts and
//! sequences can refer to each other by handle instead of by reference.
mod entity;
mod modifiers;
mod order;

use std::collections::BTreeMap;
use std::fmt;

pub use entity::{Controller, EntityParams, EntityState, EntityTemplate, Stat, StatStages};
pub use modifiers::{ModifierError, ModifierKind, ModifierMap, NamedModifiers};
pub use order::turn_order;

use crate::effect::EffectInstance;
use crate::spell::SpellCast;

// ============================================================================
// Handles
// ============================================================================

/// Index of a combatant in [`BattleState::entities`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a resolved [`SpellCast`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastId(pub u32);

/// Handle to an [`EffectInstance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceId(pub u32);

// ============================================================================
// Battle State
// ============================================================================

/// Mutable state of one battle.
#[derive(Debug, Default)]
pub struct BattleState {
    entities: Vec<EntityState>,
    casts: BTreeMap<CastId, SpellCast>,
    instances: BTreeMap<InstanceId, EffectInstance>,
    next_cast: u32,
    next_instance: u32,
    /// Turns completed since the battle began.
    pub turn: u32,
}

impl BattleState {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== entities =====

    /// Adds a combatant and returns its handle.
    pub fn insert_entity(&mut self, build: impl FnOnce(EntityId) -> EntityState) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        self.entities.push(build(id));
        id
    }

    pub fn entity(&self, id: EntityId) -> Option<&EntityState> {
        self.entities.get(id.0 as usize)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut EntityState> {
        self.entities.get_mut(id.0 as usize)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityState> {
        self.entities.iter()
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().map(|entity| entity.id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Display name of a combatant, or a placeholder for a stale handle.
    pub fn name_of(&self, id: EntityId) -> &str {
        self.entity(id).map_or("???", |entity| entity.name())
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entity(id).is_some_and(|entity| !entity.dead)
    }

    // ===== casts =====

    pub(crate) fn allocate_cast(&mut self) -> CastId {
        let id = CastId(self.next_cast);
        self.next_cast = self.next_cast.wrapping_add(1);
        id
    }

    pub fn insert_cast(&mut self, cast: SpellCast) {
        self.casts.insert(cast.id, cast);
    }

    pub fn cast(&self, id: CastId) -> Option<&SpellCast> {
        self.casts.get(&id)
    }

    pub fn cast_mut(&mut self, id: CastId) -> Option<&mut SpellCast> {
        self.casts.get_mut(&id)
    }

    // ===== effect instances =====

    pub(crate) fn allocate_instance(&mut self) -> InstanceId {
        let id = InstanceId(self.next_instance);
        self.next_instance = self.next_instance.wrapping_add(1);
        id
    }

    pub fn insert_instance(&mut self, instance: EffectInstance) {
        self.instances.insert(instance.id, instance);
    }

    pub fn instance(&self, id: InstanceId) -> Option<&EffectInstance> {
        self.instances.get(&id)
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut EffectInstance> {
        self.instances.get_mut(&id)
    }

    /// Drops casts and instances that nothing refers to anymore.
    ///
    /// Called between turns; a cast stays alive while its caster remembers it
    /// as the last result or while one of its instances is still held.
    pub fn collect_garbage(&mut self) {
        let held: Vec<InstanceId> = self
            .entities
            .iter()
            .flat_map(|entity| entity.effects.iter().chain(entity.properties.iter()))
            .copied()
            .collect();
        self.instances.retain(|id, _| held.contains(id));

        let live_casts: Vec<CastId> = self
            .entities
            .iter()
            .filter_map(|entity| entity.last_cast)
            .chain(self.instances.values().filter_map(|instance| instance.cast))
            .collect();
        self.casts.retain(|id, _| live_casts.contains(id));
    }

    /// Number of casts and instances currently stored.
    pub fn arena_len(&self) -> (usize, usize) {
        (self.casts.len(), self.instances.len())
    }
}

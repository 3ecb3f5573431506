//! Serialized definitions.
//!
//! These mirror the core types but refer to each other by name. The bundle
//! builder resolves the names into shared `Arc`s once everything is parsed.

use battle_core::{EffectHooks, EntityParams, SpellKind};
use serde::{Deserialize, Serialize};

/// Script names for each animation slot of an effect.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectAnimationNames {
    pub activation: Option<String>,
    pub deactivation: Option<String>,
    pub misc: Option<String>,
}

/// One entry of `effects.ron`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectDef {
    pub name: String,
    #[serde(default)]
    pub stackable: bool,
    #[serde(default)]
    pub hooks: EffectHooks,
    #[serde(default)]
    pub animations: EffectAnimationNames,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectChanceDef {
    pub chance: f32,
    pub effect: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectGroupDef {
    #[serde(default = "certain")]
    pub chance: f32,
    pub options: Vec<EffectChanceDef>,
}

fn certain() -> f32 {
    1.0
}

/// One entry of `spells.ron`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpellDef {
    pub name: String,
    #[serde(default)]
    pub cost: i32,
    #[serde(default)]
    pub animation: Option<String>,
    #[serde(default)]
    pub effects: Vec<EffectGroupDef>,
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub kind: SpellKind,
}

/// One entry of `entities.ron`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    pub params: EntityParams,
    /// Spells an AI-controlled entity picks from.
    #[serde(default)]
    pub moves: Vec<String>,
}

/// One entry of `enemy_pool.ron`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntryDef {
    pub entity: String,
    pub odds: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDef {
    pub entity: String,
    pub attack: String,
    pub defend: String,
    /// Spell list the hand is dealt from.
    pub spells: Vec<String>,
}

/// `encounter.ron`: who fights when the battle opens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterDef {
    pub player: PlayerDef,
    pub enemies: Vec<String>,
}

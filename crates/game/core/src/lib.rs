//! Deterministic rules of a turn-based battle.
//!
//! `battle-core` owns the battle state and every rule that mutates it: stat
//! scaling, spell casts, status effects, turn order and the phase machine in
//! [`engine::BattleEngine`]. It performs no I/O. Content arrives through an
//! [`env::Catalog`], randomness through an [`env::RandomSource`], and the
//! screen is driven through the [`env::Presentation`] traits, so the same
//! rules run under a renderer, the headless stage, or a test.
pub mod combat;
pub mod config;
pub mod context;
pub mod effect;
pub mod engine;
pub mod env;
pub mod error;
pub mod sequence;
pub mod spell;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::BattleConfig;
pub use context::BattleContext;
pub use effect::{
    AnimationSlot, Effect, EffectAnimations, EffectHooks, EffectInstance, EffectOp, EffectPhase,
    Hook, Side,
};
pub use engine::{
    BattleCommand, BattleEngine, BattleEvent, BattleFeed, BattlePhase, CommandError, Hand,
    Outcome, PlayerLoadout,
};
pub use env::{
    Catalog, EnemyOdds, EnemyPool, HeadlessStage, PcgRng, Presentation, RandomSource,
    ScriptedRng,
};
pub use error::{BattleError, ErrorSeverity};
pub use sequence::{
    ActionKind, AnimationScript, AnimationSequence, DialogueSequence, DispatchError, ScriptError,
    ScriptLine, Sequence, SequenceStatus, Sequencer,
};
pub use spell::{EffectChance, EffectGroup, OffensiveParams, Spell, SpellCast, SpellKind, StatusParams};
pub use state::{
    BattleState, CastId, Controller, EntityId, EntityParams, EntityState, EntityTemplate,
    InstanceId, ModifierError, ModifierKind, NamedModifiers, Stat, StatStages,
};

//! Capabilities injected into the battle engine.
//!
//! The engine reads content from a [`Catalog`], draws every roll from a
//! [`RandomSource`], and drives the screen through the [`Presentation`]
//! traits. [`HeadlessStage`] implements the latter in memory.
mod catalog;
mod headless;
mod rng;
mod stage;

pub use catalog::{Catalog, EnemyOdds, EnemyPool};
pub use headless::{HeadlessStage, SpawnedVisual};
pub use rng::{PcgRng, RandomSource, ScriptedRng};
pub use stage::{
    AnimationStage, AudioPlayer, DialogueDisplay, EffectSpawn, Presentation, Rgba, Transform,
    Tween, Vec3, VisualId, VisualTarget,
};

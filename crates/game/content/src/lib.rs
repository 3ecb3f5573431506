//! Data-driven battle content.
//!
//! Effects, spells, creatures, the enemy pool and the opening encounter are
//! authored in RON, battle tuning in TOML and animations in the line-based
//! script format. This crate parses them, resolves every name into shared
//! core types and rejects content that would fail at battle time:
//!
//! - unknown effect, spell, entity or script names
//! - gate operations bound outside the check hooks
//! - effects that play an animation slot they do not define
//! - malformed animation scripts
//!
//! The same content ships inside the crate (see [`builtin`]) so tools and
//! tests run without a data directory.

pub mod builtin;
pub mod bundle;
pub mod defs;
pub mod error;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use bundle::{ContentBundle, ContentSources, LoadResult, PlayerSpec};
pub use defs::{
    EffectAnimationNames, EffectChanceDef, EffectDef, EffectGroupDef, EncounterDef, EntityDef,
    PlayerDef, PoolEntryDef, SpellDef,
};
pub use error::ContentError;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, ScriptLoader};

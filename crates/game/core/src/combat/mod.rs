//! Combat formulas.
//!
//! This module provides pure functions for stat scaling, damage and hit
//! checks. Randomness is passed in as already-rolled values or through a
//! [`RandomSource`](crate::env::RandomSource) borrowed for a single roll.
//!
//! # Core Functions
//!
//! - `stat_modifier`: stage → multiplier curve
//! - `scale_hp` / `scale_stat`: battle-start stat scaling
//! - `base_damage` / `hit_damage`: per-hit damage
//! - `hit_chance` with `check_hit_percent_scale` / `check_hit_unit_scale`

pub mod damage;
pub mod formula;
pub mod hit;

pub use damage::{DamageProfile, base_damage, hit_damage, roll_critical, roll_hit_count};
pub use formula::{scale_hp, scale_stat, stat_modifier};
pub use hit::{check_hit_percent_scale, check_hit_unit_scale, hit_chance};

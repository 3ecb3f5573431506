//! Stat stages and battle-start scaling.

/// Converts a stat stage to a multiplier.
///
/// ```text
/// max(2, 2 + stage) / max(2, 2 - stage)
/// ```
///
/// Stage 0 is neutral, +1 is ×1.5, −1 is ×0.67, +6 is ×4. Stages are not
/// clamped.
pub fn stat_modifier(stage: i32) -> f32 {
    let stage = stage as f32;
    (2.0 + stage).max(2.0) / (2.0 - stage).max(2.0)
}

/// Scales an authored HP value: `base * 2 * K / 100 + K + 10`.
pub fn scale_hp(base: i32, damage_constant: i32) -> i32 {
    base.saturating_mul(2).saturating_mul(damage_constant) / 100 + damage_constant + 10
}

/// Scales an authored attack, defense or speed value: `base * 2 * K / 100 + 5`.
pub fn scale_stat(base: i32, damage_constant: i32) -> i32 {
    base.saturating_mul(2).saturating_mul(damage_constant) / 100 + 5
}

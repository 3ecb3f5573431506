//! Damage calculation.

use crate::config::BattleConfig;
use crate::env::RandomSource;

/// Inputs for one hit of an offensive spell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageProfile {
    /// Spell power.
    pub power: f32,
    /// Caster's scaled attack.
    pub attack: i32,
    /// Caster's attack stage multiplier.
    pub attack_modifier: f32,
    /// Target's scaled defense.
    pub defense: i32,
    /// Target's defense stage multiplier.
    pub defense_modifier: f32,
    /// Product of the caster's named offense modifiers.
    pub offense_modifiers: f32,
    /// Product of the target's named defense modifiers.
    pub defense_modifiers: f32,
}

/// Base damage before named modifiers, variance and criticals.
///
/// # Formula
///
/// ```text
/// ((2K/5 + 2) * power * (atk * atkMod) / (def * defMod)) / 50 + 1
/// ```
pub fn base_damage(
    damage_constant: i32,
    power: f32,
    attack: i32,
    attack_modifier: f32,
    defense: i32,
    defense_modifier: f32,
) -> f32 {
    let level = (2 * damage_constant / 5 + 2) as f32;
    let ratio = (attack as f32 * attack_modifier)
        / (defense as f32 * defense_modifier).max(f32::MIN_POSITIVE);
    (level * power * ratio) / 50.0 + 1.0
}

/// Damage of a single hit, truncated to an integer.
///
/// `variance` is the already-rolled factor from the configured variance range.
/// A critical hit ignores an unfavorable attack stage (below ×1) and a
/// favorable defense stage (above ×1), then multiplies the result by the
/// critical multiplier.
pub fn hit_damage(
    config: &BattleConfig,
    profile: &DamageProfile,
    critical: bool,
    variance: f32,
) -> i32 {
    let mut attack_modifier = profile.attack_modifier;
    let mut defense_modifier = profile.defense_modifier;
    if critical {
        attack_modifier = attack_modifier.max(1.0);
        defense_modifier = defense_modifier.min(1.0);
    }

    let mut damage = base_damage(
        config.damage_constant,
        profile.power,
        profile.attack,
        attack_modifier,
        profile.defense,
        defense_modifier,
    );
    damage *= profile.offense_modifiers;
    damage *= profile.defense_modifiers;
    damage *= variance;
    if critical {
        damage *= config.critical_multiplier;
    }
    damage as i32
}

/// Number of hits for a multi-hit spell.
///
/// Fixed at `max_hits` unless `vary` is set, in which case the count is drawn
/// from the half-open range `[min_hits, max_hits)`; `min_hits` is first
/// clamped to `max_hits`.
pub fn roll_hit_count(rng: &mut dyn RandomSource, min_hits: u32, max_hits: u32, vary: bool) -> u32 {
    if !vary {
        return max_hits;
    }
    let min_hits = min_hits.min(max_hits);
    rng.range_i32(min_hits as i32, max_hits as i32).max(0) as u32
}

/// Critical-hit roll: `value < 1 / chance`.
///
/// No value is drawn when the spell cannot land critical hits.
pub fn roll_critical(rng: &mut dyn RandomSource, can_critical: bool, chance: u32) -> bool {
    if !can_critical || chance == 0 {
        return false;
    }
    rng.value() < 1.0 / chance as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ScriptedRng;

    fn profile() -> DamageProfile {
        DamageProfile {
            power: 50.0,
            attack: 55,
            attack_modifier: 1.0,
            defense: 55,
            defense_modifier: 1.0,
            offense_modifiers: 1.0,
            defense_modifiers: 1.0,
        }
    }

    #[test]
    fn even_stats_deal_base_damage() {
        // (22 * 50 * 1) / 50 + 1 = 23
        let config = BattleConfig::default();
        assert_eq!(hit_damage(&config, &profile(), false, 1.0), 23);
    }

    #[test]
    fn variance_and_critical_scale_damage() {
        let config = BattleConfig::default();
        assert_eq!(hit_damage(&config, &profile(), false, 0.85), 19);
        assert_eq!(hit_damage(&config, &profile(), true, 1.0), 34);
    }

    #[test]
    fn critical_ignores_unfavorable_stages_only() {
        let config = BattleConfig::default();
        let weakened = DamageProfile {
            attack_modifier: 0.5,
            defense_modifier: 2.0,
            ..profile()
        };
        let normal = hit_damage(&config, &weakened, false, 1.0);
        let critical = hit_damage(&config, &weakened, true, 1.0);
        assert_eq!(normal, 6);
        assert_eq!(critical, 34);

        let boosted = DamageProfile {
            attack_modifier: 2.0,
            defense_modifier: 0.5,
            ..profile()
        };
        // favorable stages survive the critical: 22 * 50 * 4 / 50 + 1 = 89, * 1.5
        assert_eq!(hit_damage(&config, &boosted, true, 1.0), 133);
    }

    #[test]
    fn named_modifiers_multiply() {
        let config = BattleConfig::default();
        let guarded = DamageProfile {
            defense_modifiers: 0.5,
            ..profile()
        };
        assert_eq!(hit_damage(&config, &guarded, false, 1.0), 11);
    }

    #[test]
    fn hit_count_range_is_half_open() {
        let mut high = ScriptedRng::constant(1.0);
        assert_eq!(roll_hit_count(&mut high, 2, 5, true), 4);
        let mut low = ScriptedRng::constant(0.0);
        assert_eq!(roll_hit_count(&mut low, 2, 5, true), 2);
        assert_eq!(roll_hit_count(&mut low, 2, 5, false), 5);
        // min above max collapses to max
        assert_eq!(roll_hit_count(&mut low, 7, 3, true), 3);
    }

    #[test]
    fn critical_roll_uses_reciprocal_chance() {
        assert!(roll_critical(&mut ScriptedRng::constant(0.05), true, 16));
        assert!(!roll_critical(&mut ScriptedRng::constant(0.07), true, 16));
        assert!(!roll_critical(&mut ScriptedRng::constant(0.0), false, 16));
    }
}

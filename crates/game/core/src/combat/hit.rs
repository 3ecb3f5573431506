//! Hit chance and accuracy checks.
//!
//! Offensive and status spells share one hit-chance formula but compare it
//! against rolls on different scales. Both checks are kept as separate named
//! functions so that callers state which one they mean.

use crate::env::RandomSource;

/// Hit chance of a spell.
///
/// # Formula
///
/// ```text
/// spell_accuracy * (user_accuracy / target_evasion) * Π accuracy_modifiers
/// ```
pub fn hit_chance(
    spell_accuracy: f32,
    user_accuracy: f32,
    target_evasion: f32,
    accuracy_modifiers: impl IntoIterator<Item = f32>,
) -> f32 {
    let ratio = user_accuracy / target_evasion.max(f32::MIN_POSITIVE);
    accuracy_modifiers
        .into_iter()
        .fold(spell_accuracy * ratio, |hit, modifier| hit * modifier)
}

/// Offensive spells: a 0–100 roll against the percentage chance.
pub fn check_hit_percent_scale(rng: &mut dyn RandomSource, chance: f32) -> bool {
    rng.value() * 100.0 <= chance
}

/// Status spells: a 0–1 roll against the same percentage-scaled chance.
///
/// Any chance of 1 or more always hits.
pub fn check_hit_unit_scale(rng: &mut dyn RandomSource, chance: f32) -> bool {
    rng.value() <= chance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ScriptedRng;

    #[test]
    fn modifiers_scale_chance() {
        let chance = hit_chance(90.0, 1.0, 1.0, [0.5, 0.5]);
        assert!((chance - 22.5).abs() < 1e-4);
    }

    #[test]
    fn percent_scale_compares_against_percentage() {
        let mut rng = ScriptedRng::new(vec![0.2, 0.3]);
        assert!(check_hit_percent_scale(&mut rng, 25.0));
        assert!(!check_hit_percent_scale(&mut rng, 25.0));
    }

    #[test]
    fn unit_scale_almost_always_hits_with_percentage() {
        let mut rng = ScriptedRng::constant(1.0);
        assert!(check_hit_unit_scale(&mut rng, 25.0));
        assert!(!check_hit_unit_scale(&mut rng, 0.5));
    }
}

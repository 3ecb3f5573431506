//! Spell definitions and cast resolution.
//!
//! A [`Spell`] is an action template shared by every entity that knows it.
//! [`cast_spell`] resolves one invocation into a [`SpellCast`] record.
mod cast;
mod resolve;

use std::sync::Arc;

pub use cast::SpellCast;
pub use resolve::cast_spell;

use crate::effect::Effect;
use crate::env::RandomSource;
use crate::sequence::AnimationScript;

/// Parameters of a damaging spell.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OffensiveParams {
    pub power: f32,
    pub check_accuracy: bool,
    /// Hit chance in percent before accuracy and evasion.
    pub accuracy: f32,
    pub min_hits: u32,
    pub max_hits: u32,
    /// Draw the hit count from `[min_hits, max_hits)` instead of using `max_hits`.
    pub vary_hit_count: bool,
    pub can_critical: bool,
    /// A hit is critical with probability `1 / critical_chance`.
    pub critical_chance: u32,
}

impl Default for OffensiveParams {
    fn default() -> Self {
        Self {
            power: 50.0,
            check_accuracy: true,
            accuracy: 100.0,
            min_hits: 1,
            max_hits: 1,
            vary_hit_count: false,
            can_critical: true,
            critical_chance: 16,
        }
    }
}

/// Parameters of a non-damaging spell that exists to apply effects.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatusParams {
    pub check_accuracy: bool,
    pub accuracy: f32,
}

impl Default for StatusParams {
    fn default() -> Self {
        Self {
            check_accuracy: true,
            accuracy: 100.0,
        }
    }
}

/// How a spell checks for a hit and computes damage.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpellKind {
    /// Always hits, deals no damage.
    #[default]
    Flavor,
    Offensive(OffensiveParams),
    Status(StatusParams),
}

/// One weighted alternative of an [`EffectGroup`].
#[derive(Clone, Debug)]
pub struct EffectChance {
    pub chance: f32,
    pub effect: Arc<Effect>,
}

/// Effects a spell may invoke on each hit.
///
/// The group fires with probability `chance`; a second roll then walks the
/// cumulative weights of the alternatives and picks the first one whose
/// running total reaches it, or none if the weights sum below the roll.
#[derive(Clone, Debug)]
pub struct EffectGroup {
    pub chance: f32,
    pub options: Vec<EffectChance>,
}

impl EffectGroup {
    /// A group that always invokes one effect.
    pub fn always(effect: Arc<Effect>) -> Self {
        Self {
            chance: 1.0,
            options: vec![EffectChance {
                chance: 1.0,
                effect,
            }],
        }
    }

    pub fn roll(&self, rng: &mut dyn RandomSource) -> Option<&Arc<Effect>> {
        if rng.value() > self.chance {
            return None;
        }
        let roll = rng.value();
        let mut cumulative = 0.0;
        for option in &self.options {
            cumulative += option.chance;
            if roll <= cumulative {
                return Some(&option.effect);
            }
        }
        None
    }
}

/// Action template.
#[derive(Clone, Debug, Default)]
pub struct Spell {
    pub name: String,
    pub cost: i32,
    pub animation: Option<Arc<AnimationScript>>,
    /// Rolled once per hit of damage.
    pub effects: Vec<EffectGroup>,
    /// Applied to the caster for the duration of the cast.
    pub properties: Vec<Arc<Effect>>,
    pub kind: SpellKind,
}

impl Spell {
    pub fn new(name: impl Into<String>, kind: SpellKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    /// Builder: set MP cost.
    pub fn with_cost(mut self, cost: i32) -> Self {
        self.cost = cost;
        self
    }

    /// Builder: set animation script.
    pub fn with_animation(mut self, script: Arc<AnimationScript>) -> Self {
        self.animation = Some(script);
        self
    }

    /// Builder: add an effect group.
    pub fn with_effect(mut self, group: EffectGroup) -> Self {
        self.effects.push(group);
        self
    }

    /// Builder: add a property.
    pub fn with_property(mut self, property: Arc<Effect>) -> Self {
        self.properties.push(property);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ScriptedRng;

    fn group() -> EffectGroup {
        EffectGroup {
            chance: 0.8,
            options: vec![
                EffectChance {
                    chance: 0.5,
                    effect: Arc::new(Effect::new("Burn")),
                },
                EffectChance {
                    chance: 0.25,
                    effect: Arc::new(Effect::new("Freeze")),
                },
            ],
        }
    }

    #[test]
    fn group_chance_gates_the_roll() {
        let mut rng = ScriptedRng::new(vec![0.9, 0.1]);
        assert!(group().roll(&mut rng).is_none());
    }

    #[test]
    fn cumulative_weights_pick_alternatives() {
        let pick = |second: f32| {
            let mut rng = ScriptedRng::new(vec![0.5, second]);
            group().roll(&mut rng).map(|effect| effect.name.clone())
        };
        assert_eq!(pick(0.2).as_deref(), Some("Burn"));
        assert_eq!(pick(0.7).as_deref(), Some("Freeze"));
        assert_eq!(pick(0.9), None);
    }
}

use crate::state::{ModifierKind, Stat};

/// Which participant of an effect instance an operation touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    User,
    Target,
}

/// Animation slot of an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnimationSlot {
    Activation,
    Deactivation,
    Misc,
}

/// Primitive operation an effect hook can perform.
///
/// Gates narrow the outcome of a check hook; every other variant is an action.
/// Named references (effects, spells) are checked when content is loaded.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectOp {
    // ===== gates =====
    /// Passes while the instance has been active for fewer than N turns.
    ActiveForLessThan(u32),
    /// Passes if the user's cast this turn succeeded.
    UserLastMoveSucceeded,
    /// Passes if the user's selected spell has this name.
    UserMoveIs(String),
    /// Passes if the user's HP fraction is above the value (clamped to 0..=1).
    UserHealthAbove(f32),
    /// Passes if the instance's own cast is of the named spell.
    CurrentMoveIs(String),

    // ===== actions =====
    /// Queues a dialogue line; `[user]` and `[target]` are replaced by names.
    SendDialogue(String),
    /// Adds this instance to the side's active effects.
    ApplyTo(Side),
    /// Removes this instance from the side's active effects.
    RemoveFrom(Side),
    /// Removes the first active effect with the given name from the side.
    RemoveNamedFrom { side: Side, name: String },
    /// Grants the named effect to the user as a property for its next cast.
    GrantPropertyToUser(String),
    /// `clamp(damage_applied * scale, min, max)` MP to the side.
    ModifyMpFromDamageDealt { side: Side, scale: f32, min: i32, max: i32 },
    /// `clamp(damage_taken * scale, min, max)` MP to the side, from its own damage taken.
    ModifyMpFromDamageTaken { side: Side, scale: f32, min: i32, max: i32 },
    /// Adds a named modifier keyed by the effect name.
    ///
    /// With `per_turn` the amount is raised to the power of the turns active.
    AddModifier {
        side: Side,
        kind: ModifierKind,
        amount: f32,
        #[cfg_attr(feature = "serde", serde(default))]
        per_turn: bool,
    },
    /// Removes a named modifier, keyed by the effect name unless `key` is set.
    RemoveModifier {
        side: Side,
        kind: ModifierKind,
        #[cfg_attr(feature = "serde", serde(default))]
        key: Option<String>,
    },
    /// Shifts a stat stage.
    ModifyStage { side: Side, stat: Stat, delta: i32 },
    /// Queues one of the effect's animations.
    PlayAnimation(AnimationSlot),
}

impl EffectOp {
    pub const fn is_gate(&self) -> bool {
        matches!(
            self,
            EffectOp::ActiveForLessThan(_)
                | EffectOp::UserLastMoveSucceeded
                | EffectOp::UserMoveIs(_)
                | EffectOp::UserHealthAbove(_)
                | EffectOp::CurrentMoveIs(_)
        )
    }

    /// Effect name this operation refers to, if any.
    pub fn effect_reference(&self) -> Option<&str> {
        match self {
            EffectOp::GrantPropertyToUser(name) | EffectOp::RemoveNamedFrom { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// Spell name this operation refers to, if any.
    pub fn spell_reference(&self) -> Option<&str> {
        match self {
            EffectOp::UserMoveIs(name) | EffectOp::CurrentMoveIs(name) => Some(name),
            _ => None,
        }
    }
}

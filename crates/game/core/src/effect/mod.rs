//! Status effects and spell properties.
//!
//! An [`Effect`] is a shared definition: a name, a stackable flag, and a list
//! of [`EffectOp`]s bound to each lifecycle [`Hook`]. Applying it creates an
//! [`EffectInstance`] tied to a (user, target, cast) triple; the functions in
//! [`exec`] run an instance's hooks against the battle state.
//!
//! # Instance lifecycle
//!
//! ```text
//! Pending ──CheckSuccess──> Active ──CheckRemainActive fails──> Rejected
//!    └──────────────────────> Rejected
//! ```
//!
//! Only an `Active` instance runs its action hooks.
pub mod exec;
mod instance;
mod op;

use std::sync::Arc;

pub use instance::{EffectInstance, EffectPhase};
pub use op::{AnimationSlot, EffectOp, Side};

use crate::sequence::AnimationScript;

/// Lifecycle points an effect can bind operations to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Hook {
    /// Decides whether a fresh instance becomes active.
    CheckSuccess,
    /// Decides at turn end whether an active instance stays.
    CheckRemainActive,
    OnActivate,
    OnMoveSelected,
    OnDeactivate,
    OnTurnStart,
    OnTurnEnd,
}

impl Hook {
    pub const ALL: [Hook; 7] = [
        Hook::CheckSuccess,
        Hook::CheckRemainActive,
        Hook::OnActivate,
        Hook::OnMoveSelected,
        Hook::OnDeactivate,
        Hook::OnTurnStart,
        Hook::OnTurnEnd,
    ];

    /// Whether gate operations are meaningful in this hook.
    pub const fn is_check(self) -> bool {
        matches!(self, Hook::CheckSuccess | Hook::CheckRemainActive)
    }
}

/// Operations bound to each hook.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EffectHooks {
    pub check_success: Vec<EffectOp>,
    pub check_remain_active: Vec<EffectOp>,
    pub on_activate: Vec<EffectOp>,
    pub on_move_selected: Vec<EffectOp>,
    pub on_deactivate: Vec<EffectOp>,
    pub on_turn_start: Vec<EffectOp>,
    pub on_turn_end: Vec<EffectOp>,
}

impl EffectHooks {
    pub fn ops(&self, hook: Hook) -> &[EffectOp] {
        match hook {
            Hook::CheckSuccess => &self.check_success,
            Hook::CheckRemainActive => &self.check_remain_active,
            Hook::OnActivate => &self.on_activate,
            Hook::OnMoveSelected => &self.on_move_selected,
            Hook::OnDeactivate => &self.on_deactivate,
            Hook::OnTurnStart => &self.on_turn_start,
            Hook::OnTurnEnd => &self.on_turn_end,
        }
    }

    pub fn ops_mut(&mut self, hook: Hook) -> &mut Vec<EffectOp> {
        match hook {
            Hook::CheckSuccess => &mut self.check_success,
            Hook::CheckRemainActive => &mut self.check_remain_active,
            Hook::OnActivate => &mut self.on_activate,
            Hook::OnMoveSelected => &mut self.on_move_selected,
            Hook::OnDeactivate => &mut self.on_deactivate,
            Hook::OnTurnStart => &mut self.on_turn_start,
            Hook::OnTurnEnd => &mut self.on_turn_end,
        }
    }

    /// Every (hook, op) pair, in hook order.
    pub fn iter(&self) -> impl Iterator<Item = (Hook, &EffectOp)> {
        Hook::ALL
            .into_iter()
            .flat_map(move |hook| self.ops(hook).iter().map(move |op| (hook, op)))
    }
}

/// Animations an effect can play through [`EffectOp::PlayAnimation`].
#[derive(Clone, Debug, Default)]
pub struct EffectAnimations {
    pub activation: Option<Arc<AnimationScript>>,
    pub deactivation: Option<Arc<AnimationScript>>,
    pub misc: Option<Arc<AnimationScript>>,
}

impl EffectAnimations {
    pub fn get(&self, slot: AnimationSlot) -> Option<&Arc<AnimationScript>> {
        match slot {
            AnimationSlot::Activation => self.activation.as_ref(),
            AnimationSlot::Deactivation => self.deactivation.as_ref(),
            AnimationSlot::Misc => self.misc.as_ref(),
        }
    }
}

/// Reusable status or property definition.
#[derive(Clone, Debug, Default)]
pub struct Effect {
    pub name: String,
    /// Whether several instances may be active on one entity at once.
    pub stackable: bool,
    pub hooks: EffectHooks,
    pub animations: EffectAnimations,
}

impl Effect {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder: mark as stackable.
    pub fn stackable(mut self) -> Self {
        self.stackable = true;
        self
    }

    /// Builder: bind an operation to a hook.
    pub fn on(mut self, hook: Hook, op: EffectOp) -> Self {
        self.hooks.ops_mut(hook).push(op);
        self
    }
}

use std::sync::Arc;

use super::Effect;
use crate::state::{CastId, EntityId, InstanceId};

/// Where an instance is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectPhase {
    /// Created, success not checked yet.
    Pending,
    Active,
    Rejected,
}

/// One application of an [`Effect`].
#[derive(Clone, Debug)]
pub struct EffectInstance {
    pub id: InstanceId,
    pub effect: Arc<Effect>,
    pub user: EntityId,
    pub target: EntityId,
    /// Cast that spawned this instance, if any.
    pub cast: Option<CastId>,
    pub turns_active: u32,
    pub phase: EffectPhase,
}

impl EffectInstance {
    pub fn new(
        id: InstanceId,
        effect: Arc<Effect>,
        user: EntityId,
        target: EntityId,
        cast: Option<CastId>,
    ) -> Self {
        Self {
            id,
            effect,
            user,
            target,
            cast,
            turns_active: 0,
            phase: EffectPhase::Pending,
        }
    }

    pub fn name(&self) -> &str {
        &self.effect.name
    }

    /// Whether hooks fire for this instance.
    pub fn cast_success(&self) -> bool {
        self.phase == EffectPhase::Active
    }
}

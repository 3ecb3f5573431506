//! Player input.

use super::BattlePhase;
use crate::error::{BattleError, ErrorSeverity};
use crate::state::EntityId;

/// Action chosen by a player for the current turn.
///
/// A missing target defaults to the first living enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleCommand {
    Attack { target: Option<EntityId> },
    /// Always targets the player itself.
    Defend,
    /// Casts the spell in a slot of the dealt hand.
    Cast { slot: usize, target: Option<EntityId> },
}

/// Reasons a command is refused.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("not accepting input during {phase}")]
    NotAcceptingInput { phase: BattlePhase },

    #[error("entity {0} is not a player")]
    NotAPlayer(EntityId),

    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    #[error("entity {0} is defeated")]
    EntityDefeated(EntityId),

    #[error("hand slot {slot} out of range (hand holds {len})")]
    HandSlotOutOfRange { slot: usize, len: usize },

    #[error("no living enemy to target")]
    NoTarget,
}

impl BattleError for CommandError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotAcceptingInput { .. } => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotAcceptingInput { .. } => "COMMAND_NOT_ACCEPTING_INPUT",
            Self::NotAPlayer(_) => "COMMAND_NOT_A_PLAYER",
            Self::UnknownEntity(_) => "COMMAND_UNKNOWN_ENTITY",
            Self::EntityDefeated(_) => "COMMAND_ENTITY_DEFEATED",
            Self::HandSlotOutOfRange { .. } => "COMMAND_HAND_SLOT_OUT_OF_RANGE",
            Self::NoTarget => "COMMAND_NO_TARGET",
        }
    }
}

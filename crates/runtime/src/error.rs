//! Errors surfaced by the runtime API.

use battle_core::{BattleError, CommandError, EntityId, ErrorSeverity};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("command for {player} rejected")]
    Command {
        player: EntityId,
        #[source]
        source: CommandError,
    },

    #[error("battle has no players to drive")]
    NoPlayers,
}

impl BattleError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Command { source, .. } => source.severity(),
            Self::NoPlayers => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Command { source, .. } => source.error_code(),
            Self::NoPlayers => "RUNTIME_NO_PLAYERS",
        }
    }
}

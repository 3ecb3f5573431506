//! Load-time validation errors.

use battle_core::{AnimationSlot, BattleError, ErrorSeverity, Hook, ScriptError};

/// Authored content that cannot be turned into a catalog.
///
/// Every variant names the definition it was found in so the author can fix
/// the file without a debugger.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ContentError {
    #[error("{kind} `{name}` is defined more than once")]
    DuplicateName { kind: &'static str, name: String },

    #[error("`{owner}` refers to unknown {kind} `{name}`")]
    UnknownReference {
        owner: String,
        kind: &'static str,
        name: String,
    },

    #[error("effect `{effect}` uses gate {op} in {hook}, which only accepts actions")]
    GateOutsideCheckHook {
        effect: String,
        hook: Hook,
        op: String,
    },

    #[error("effect `{effect}` plays its {slot} animation but defines none")]
    MissingEffectAnimation { effect: String, slot: AnimationSlot },

    #[error("`{owner}` has chance {value}, expected a value in 0..=1")]
    ChanceOutOfRange { owner: String, value: f32 },

    #[error("animation script `{name}`: {source}")]
    Script {
        name: String,
        #[source]
        source: ScriptError,
    },
}

impl BattleError for ContentError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateName { .. } => "CONTENT_DUPLICATE_NAME",
            Self::UnknownReference { .. } => "CONTENT_UNKNOWN_REFERENCE",
            Self::GateOutsideCheckHook { .. } => "CONTENT_GATE_OUTSIDE_CHECK_HOOK",
            Self::MissingEffectAnimation { .. } => "CONTENT_MISSING_EFFECT_ANIMATION",
            Self::ChanceOutOfRange { .. } => "CONTENT_CHANCE_OUT_OF_RANGE",
            Self::Script { .. } => "CONTENT_SCRIPT",
        }
    }
}

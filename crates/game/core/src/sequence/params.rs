//! Parameter parsing for script actions.

use super::ActionKind;
use crate::error::{BattleError, ErrorSeverity};

/// Failure to execute one script line.
///
/// The line is skipped and playback continues with the next one.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("{action}: missing parameter")]
    MissingParam { action: ActionKind },

    #[error("{action}: expected at least {expected} values, found {found}")]
    TooFewValues {
        action: ActionKind,
        expected: usize,
        found: usize,
    },

    #[error("{action}: value {index} `{value}` is not a valid {expected}")]
    BadValue {
        action: ActionKind,
        index: usize,
        value: String,
        expected: &'static str,
    },

    #[error("{action}: sequence has no target")]
    NoTarget { action: ActionKind },

    #[error("{action}: sequence is not bound to a spell cast")]
    NoCast { action: ActionKind },

    #[error("{action}: effect slot {index} was never spawned ({spawned} spawned)")]
    UnknownEffectSlot {
        action: ActionKind,
        index: usize,
        spawned: usize,
    },

    #[error("EndLoop without a matching BeginLoop")]
    UnbalancedLoop,
}

impl BattleError for DispatchError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownEffectSlot { .. } | Self::UnbalancedLoop => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingParam { .. } => "DISPATCH_MISSING_PARAM",
            Self::TooFewValues { .. } => "DISPATCH_TOO_FEW_VALUES",
            Self::BadValue { .. } => "DISPATCH_BAD_VALUE",
            Self::NoTarget { .. } => "DISPATCH_NO_TARGET",
            Self::NoCast { .. } => "DISPATCH_NO_CAST",
            Self::UnknownEffectSlot { .. } => "DISPATCH_UNKNOWN_EFFECT_SLOT",
            Self::UnbalancedLoop => "DISPATCH_UNBALANCED_LOOP",
        }
    }
}

/// What a script line operates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Address {
    User,
    Target,
    /// Index into the effects spawned by this sequence, in spawn order.
    Effect(usize),
}

impl Address {
    pub fn is_combatant(self) -> bool {
        matches!(self, Address::User | Address::Target)
    }
}

/// Comma-separated parameter values of one line.
pub(super) struct Values<'a> {
    action: ActionKind,
    values: Vec<&'a str>,
}

impl<'a> Values<'a> {
    /// Splits `param`, requiring at least `min` values.
    pub fn split(
        action: ActionKind,
        param: Option<&'a str>,
        min: usize,
    ) -> Result<Self, DispatchError> {
        let param = param.ok_or(DispatchError::MissingParam { action })?;
        let values: Vec<&str> = param.split(',').map(str::trim).collect();
        if values.len() < min {
            return Err(DispatchError::TooFewValues {
                action,
                expected: min,
                found: values.len(),
            });
        }
        Ok(Self { action, values })
    }

    pub fn text(&self, index: usize) -> Result<&'a str, DispatchError> {
        self.values
            .get(index)
            .copied()
            .ok_or(DispatchError::TooFewValues {
                action: self.action,
                expected: index + 1,
                found: self.values.len(),
            })
    }

    pub fn f32(&self, index: usize) -> Result<f32, DispatchError> {
        let text = self.text(index)?;
        text.parse().map_err(|_| self.bad(index, text, "number"))
    }

    pub fn i32(&self, index: usize) -> Result<i32, DispatchError> {
        let text = self.text(index)?;
        text.parse().map_err(|_| self.bad(index, text, "integer"))
    }

    pub fn bool(&self, index: usize) -> Result<bool, DispatchError> {
        let text = self.text(index)?;
        if text.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if text.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(self.bad(index, text, "boolean"))
        }
    }

    /// Reads the address token at `token`.
    ///
    /// `User` and `Target` name the combatants. Anything else addresses a
    /// spawned effect by the index stored at `slot`, or by the token itself
    /// when the line has no value there.
    pub fn address(&self, token: usize, slot: usize) -> Result<Address, DispatchError> {
        let text = self.text(token)?;
        match text {
            "User" => Ok(Address::User),
            "Target" => Ok(Address::Target),
            _ => {
                let (index, raw) = match self.values.get(slot) {
                    Some(raw) => (slot, *raw),
                    None => (token, text),
                };
                raw.parse::<usize>()
                    .map(Address::Effect)
                    .map_err(|_| self.bad(index, raw, "effect index"))
            }
        }
    }

    fn bad(&self, index: usize, value: &str, expected: &'static str) -> DispatchError {
        DispatchError::BadValue {
            action: self.action,
            index,
            value: value.to_owned(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_resolve_by_token_or_slot() {
        let values = Values::split(ActionKind::Move, Some("User, 30, 0, 5, 0"), 5).unwrap();
        assert_eq!(values.address(0, 5), Ok(Address::User));

        let values = Values::split(ActionKind::Move, Some("Spark,30,0,5,0,2"), 5).unwrap();
        assert_eq!(values.address(0, 5), Ok(Address::Effect(2)));

        let values = Values::split(ActionKind::Move, Some("1,30,0,5,0"), 5).unwrap();
        assert_eq!(values.address(0, 5), Ok(Address::Effect(1)));
    }

    #[test]
    fn short_params_are_reported() {
        assert_eq!(
            Values::split(ActionKind::Move, Some("A,B"), 5).err(),
            Some(DispatchError::TooFewValues {
                action: ActionKind::Move,
                expected: 5,
                found: 2,
            })
        );
        assert_eq!(
            Values::split(ActionKind::Move, None, 5).err(),
            Some(DispatchError::MissingParam {
                action: ActionKind::Move
            })
        );
    }

    #[test]
    fn typed_reads_reject_garbage() {
        let values = Values::split(ActionKind::ChangeAnimationState, Some("User,Run,maybe"), 3)
            .unwrap();
        assert!(values.bool(2).is_err());
        assert!(values.f32(1).is_err());
        assert_eq!(values.text(1), Ok("Run"));
    }
}

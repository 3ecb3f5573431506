//! Animation script format.
//!
//! One action per line, pipe-delimited:
//!
//! ```text
//! frame|Action[|param]
//! ```
//!
//! `frame` is a positive frame number, `Action` one of [`ActionKind`], and
//! `param` an optional comma-separated argument list whose shape depends on
//! the action. Parameters are not interpreted here; the animation sequence
//! checks them when the line fires.

use std::str::FromStr;

use crate::error::{BattleError, ErrorSeverity};

/// Every action a script line may name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionKind {
    ChangeUserAnimation,
    ChangeTargetAnimation,
    TerminateAnimation,
    GenerateEffect,
    TerminateEffect,
    Move,
    Rotate,
    Scale,
    Color,
    Vibrate,
    ChangeAnimationSpeed,
    ChangeAnimationState,
    PlaySound,
    BeginLoop,
    EndLoop,
    ApplyDamage,
}

/// One parsed line.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptLine {
    pub frame: u32,
    pub action: ActionKind,
    pub param: Option<String>,
}

/// Malformed script text.
///
/// Parsing stops at the first bad line; the whole script is rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("line {line}: expected 2 or 3 fields, found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: invalid frame number `{value}`")]
    BadFrame { line: usize, value: String },

    #[error("line {line}: unknown action `{value}`")]
    UnknownAction { line: usize, value: String },
}

impl BattleError for ScriptError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::FieldCount { .. } => "SCRIPT_FIELD_COUNT",
            Self::BadFrame { .. } => "SCRIPT_BAD_FRAME",
            Self::UnknownAction { .. } => "SCRIPT_UNKNOWN_ACTION",
        }
    }
}

/// Parsed animation script, shared by every sequence that plays it.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationScript {
    pub name: String,
    lines: Vec<ScriptLine>,
}

impl AnimationScript {
    /// Parses script text. Blank lines are ignored.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, ScriptError> {
        let mut lines = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let raw = raw.trim_end_matches('\r');
            if raw.trim().is_empty() {
                continue;
            }
            lines.push(parse_line(index + 1, raw)?);
        }
        Ok(Self {
            name: name.into(),
            lines,
        })
    }

    pub fn from_lines(name: impl Into<String>, lines: Vec<ScriptLine>) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }

    pub fn lines(&self) -> &[ScriptLine] {
        &self.lines
    }

    /// Lines scheduled for `frame`, in script order.
    pub fn lines_at(&self, frame: u32) -> impl Iterator<Item = &ScriptLine> {
        self.lines.iter().filter(move |line| line.frame == frame)
    }

    pub fn last_frame(&self) -> u32 {
        self.lines.iter().map(|line| line.frame).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn parse_line(line: usize, raw: &str) -> Result<ScriptLine, ScriptError> {
    let fields: Vec<&str> = raw.split('|').collect();
    if !(2..=3).contains(&fields.len()) {
        return Err(ScriptError::FieldCount {
            line,
            found: fields.len(),
        });
    }

    let frame_text = fields[0].trim();
    let frame = frame_text.parse::<u32>().map_err(|_| ScriptError::BadFrame {
        line,
        value: frame_text.to_owned(),
    })?;

    let action_text = fields[1].trim();
    let action = ActionKind::from_str(action_text).map_err(|_| ScriptError::UnknownAction {
        line,
        value: action_text.to_owned(),
    })?;

    Ok(ScriptLine {
        frame,
        action,
        param: fields.get(2).map(|param| (*param).to_owned()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lines_in_order() {
        let script = AnimationScript::parse(
            "slash",
            "1|ChangeUserAnimation|Attack\r\n\n3|Move|User,30,0,5,0\n3|ApplyDamage\n10|TerminateAnimation\n",
        )
        .unwrap();

        assert_eq!(script.lines().len(), 4);
        assert_eq!(script.lines()[0].param.as_deref(), Some("Attack"));
        assert_eq!(script.lines()[2].param, None);
        let frame_three: Vec<_> = script.lines_at(3).map(|line| line.action).collect();
        assert_eq!(frame_three, vec![ActionKind::Move, ActionKind::ApplyDamage]);
        assert_eq!(script.last_frame(), 10);
    }

    #[test]
    fn missing_param_still_parses() {
        let script = AnimationScript::parse("bare", "1|Move").unwrap();
        assert_eq!(script.lines()[0].action, ActionKind::Move);
        assert_eq!(script.lines()[0].param, None);
    }

    #[test]
    fn rejects_bad_field_count() {
        let err = AnimationScript::parse("bad", "1|Move|User|extra").unwrap_err();
        assert_eq!(err, ScriptError::FieldCount { line: 1, found: 4 });

        let err = AnimationScript::parse("bad", "1|PlaySound|hit\n2").unwrap_err();
        assert_eq!(err, ScriptError::FieldCount { line: 2, found: 1 });
    }

    #[test]
    fn rejects_unknown_action_and_bad_frame() {
        let err = AnimationScript::parse("bad", "1|Teleport|User").unwrap_err();
        assert!(matches!(err, ScriptError::UnknownAction { line: 1, .. }));
        assert_eq!(err.error_code(), "SCRIPT_UNKNOWN_ACTION");

        let err = AnimationScript::parse("bad", "x|Move|User").unwrap_err();
        assert!(matches!(err, ScriptError::BadFrame { line: 1, .. }));
    }
}

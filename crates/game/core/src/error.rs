//! Error classification shared by every battle crate.
//!
//! Concrete errors live next to the code that raises them (`ScriptError` in
//! the sequence module, `ModifierError` in state, and so on). A content
//! mistake only aborts the operation that hit it, such as one script line or
//! one effect op, and the battle keeps running. Misses and missing MP are
//! ordinary cast outcomes and never surface here.

/// How bad an error is, which decides how it is logged and whether the
/// caller may try again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Wrong moment, right request. A command sent outside the input window.
    Recoverable,
    /// Bad content or bad input. A malformed script line, an unknown
    /// modifier key, a hand slot that does not exist.
    Validation,
    /// The engine reached a state it should not. An effect registry slot that
    /// was never spawned, an unbalanced loop.
    Internal,
    /// Nothing sensible can happen next.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }
}

/// Implemented by every error enum in the workspace next to its
/// `thiserror::Error` derive.
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier for log filtering and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Logs an error at a level matching its severity.
pub fn report<E: BattleError>(error: &E, operation: &str) {
    let code = error.error_code();
    let severity = error.severity();
    match severity {
        ErrorSeverity::Recoverable => {
            tracing::debug!(code, operation, severity = severity.as_str(), "{error}");
        }
        ErrorSeverity::Validation => {
            tracing::warn!(code, operation, severity = severity.as_str(), "{error}");
        }
        ErrorSeverity::Internal | ErrorSeverity::Fatal => {
            tracing::error!(code, operation, severity = severity.as_str(), "{error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("probe")]
    struct Probe;

    impl BattleError for Probe {
        fn severity(&self) -> ErrorSeverity {
            ErrorSeverity::Internal
        }
    }

    #[test]
    fn error_code_defaults_to_the_type_name() {
        assert!(Probe.error_code().ends_with("Probe"));
        assert_eq!(Probe.severity().as_str(), "internal");
        report(&Probe, "probe");
    }
}

//! Named multiplicative modifiers.
//!
//! Each combatant carries three maps (offense, defense, accuracy). Effects add
//! a multiplier under their own name and remove it again when they expire, so
//! keys are unique per map.

use std::collections::BTreeMap;

use crate::error::{BattleError, ErrorSeverity};

/// Which modifier map an entry belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierKind {
    /// Multiplies damage dealt by the holder.
    Offense,
    /// Multiplies damage taken by the holder.
    Defense,
    /// Multiplies the hit chance of the holder's spells.
    Accuracy,
}

/// Errors raised by modifier bookkeeping.
///
/// These are authoring mistakes: the operation is logged and skipped.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ModifierError {
    #[error("{kind} modifier `{key}` is already present")]
    DuplicateKey { kind: ModifierKind, key: String },

    #[error("{kind} modifier `{key}` is not present")]
    MissingKey { kind: ModifierKind, key: String },
}

impl BattleError for ModifierError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateKey { .. } => "MODIFIER_DUPLICATE_KEY",
            Self::MissingKey { .. } => "MODIFIER_MISSING_KEY",
        }
    }
}

/// Key → multiplier map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModifierMap {
    entries: BTreeMap<String, f32>,
}

impl ModifierMap {
    pub fn get(&self, key: &str) -> Option<f32> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.entries.values().copied()
    }

    /// Product of every multiplier; `1.0` when empty.
    pub fn product(&self) -> f32 {
        self.values().product()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// The three named modifier maps of a combatant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NamedModifiers {
    pub offense: ModifierMap,
    pub defense: ModifierMap,
    pub accuracy: ModifierMap,
}

impl NamedModifiers {
    pub fn map(&self, kind: ModifierKind) -> &ModifierMap {
        match kind {
            ModifierKind::Offense => &self.offense,
            ModifierKind::Defense => &self.defense,
            ModifierKind::Accuracy => &self.accuracy,
        }
    }

    fn map_mut(&mut self, kind: ModifierKind) -> &mut ModifierMap {
        match kind {
            ModifierKind::Offense => &mut self.offense,
            ModifierKind::Defense => &mut self.defense,
            ModifierKind::Accuracy => &mut self.accuracy,
        }
    }

    /// Adds a multiplier under `key`.
    ///
    /// An existing key is left untouched and reported as an error.
    pub fn add(
        &mut self,
        kind: ModifierKind,
        key: impl Into<String>,
        value: f32,
    ) -> Result<(), ModifierError> {
        let key = key.into();
        let map = self.map_mut(kind);
        if map.entries.contains_key(&key) {
            return Err(ModifierError::DuplicateKey { kind, key });
        }
        map.entries.insert(key, value);
        Ok(())
    }

    /// Removes the multiplier stored under `key` and returns it.
    pub fn remove(&mut self, kind: ModifierKind, key: &str) -> Result<f32, ModifierError> {
        self.map_mut(kind)
            .entries
            .remove(key)
            .ok_or_else(|| ModifierError::MissingKey {
                kind,
                key: key.to_owned(),
            })
    }

    pub fn clear(&mut self) {
        self.offense.clear();
        self.defense.clear();
        self.accuracy.clear();
    }
}

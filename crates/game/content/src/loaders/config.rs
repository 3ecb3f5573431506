//! Battle configuration loader.

use std::path::Path;

use anyhow::Context;
use battle_core::BattleConfig;

use crate::bundle::LoadResult;
use crate::loaders::read_file;

/// Loader for [`BattleConfig`] from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads a config file. Keys missing from the file keep their defaults.
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> LoadResult<BattleConfig> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(BattleConfig::default());
        }
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, BattleConfig::default());
    }

    #[test]
    fn partial_file_overrides_named_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "critical_multiplier = 2.0\nhand_size = 6\n").unwrap();

        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.critical_multiplier, 2.0);
        assert_eq!(config.hand_size, 6);
        assert_eq!(config.player_mp_per_turn, BattleConfig::DEFAULT_PLAYER_MP_PER_TURN);
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "hand_size = \"four\"\n").unwrap();

        let err = ConfigLoader::load(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}

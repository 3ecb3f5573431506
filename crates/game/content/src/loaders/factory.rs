//! Content factory for loading a whole content directory.

use std::path::{Path, PathBuf};

use battle_core::BattleConfig;

use crate::bundle::{ContentBundle, ContentSources, LoadResult};
use crate::loaders::{ConfigLoader, ScriptLoader, read_file};

/// Loads battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml        (optional)
/// ├── effects.ron
/// ├── spells.ron
/// ├── entities.ron
/// ├── enemy_pool.ron
/// ├── encounter.ron
/// └── animations/
///     ├── strike.anim
///     └── fireball.anim
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Loads `config.toml`, or the defaults when there is none.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        ConfigLoader::load_or_default(&self.data_dir.join("config.toml"))
    }

    /// Reads every content file without parsing it.
    pub fn load_sources(&self) -> LoadResult<ContentSources> {
        let config_path = self.data_dir.join("config.toml");
        let config = if config_path.exists() {
            Some(read_file(&config_path)?)
        } else {
            None
        };
        Ok(ContentSources {
            config,
            effects: read_file(&self.data_dir.join("effects.ron"))?,
            spells: read_file(&self.data_dir.join("spells.ron"))?,
            entities: read_file(&self.data_dir.join("entities.ron"))?,
            enemy_pool: read_file(&self.data_dir.join("enemy_pool.ron"))?,
            encounter: read_file(&self.data_dir.join("encounter.ron"))?,
            scripts: ScriptLoader::load_dir(&self.data_dir.join("animations"))?,
        })
    }

    /// Reads, parses and validates the whole directory.
    pub fn load(&self) -> LoadResult<ContentBundle> {
        tracing::info!(dir = %self.data_dir.display(), "loading content");
        ContentBundle::build(&self.load_sources()?)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

//! Animation script loader.

use std::path::Path;

use anyhow::Context;

use crate::bundle::LoadResult;
use crate::loaders::read_file;

/// File extension of animation scripts.
pub const SCRIPT_EXTENSION: &str = "anim";

/// Reads every `*.anim` file in a directory.
pub struct ScriptLoader;

impl ScriptLoader {
    /// Returns `(name, text)` pairs sorted by name, where the name is the file
    /// stem. A missing directory yields no scripts.
    pub fn load_dir(dir: &Path) -> LoadResult<Vec<(String, String)>> {
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "no animation directory");
            return Ok(Vec::new());
        }

        let mut scripts = Vec::new();
        let entries =
            std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SCRIPT_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            scripts.push((name.to_owned(), read_file(&path)?));
        }
        scripts.sort_by(|a, b| a.0.cmp(&b.0));
        tracing::debug!(dir = %dir.display(), count = scripts.len(), "read animation scripts");
        Ok(scripts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_only_script_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("zap.anim"), "1|TerminateAnimation").unwrap();
        std::fs::write(dir.path().join("bonk.anim"), "1|ApplyDamage").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let scripts = ScriptLoader::load_dir(dir.path()).unwrap();
        let names: Vec<&str> = scripts.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["bonk", "zap"]);
        assert_eq!(scripts[0].1, "1|ApplyDamage");
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ScriptLoader::load_dir(&dir.path().join("animations")).unwrap().is_empty());
    }
}

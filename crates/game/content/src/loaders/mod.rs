//! Content loaders for reading battle data from disk.
//!
//! Loaders only read files; parsing and validation happen in
//! [`ContentBundle::build`](crate::ContentBundle::build), so data read from
//! disk and the built-in data go through the same checks.

pub mod config;
pub mod factory;
pub mod scripts;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use scripts::ScriptLoader;

use std::path::Path;

use anyhow::Context;

use crate::bundle::LoadResult;

/// Reads a whole file to a string.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

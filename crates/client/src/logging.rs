//! Log setup for the terminal client.
//!
//! stdout carries the battle transcript, so logs go to stderr and, when
//! possible, to a per-session file.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Logs always go to
/// stderr; the file layer is skipped when the log directory cannot be
/// created. The returned guard flushes the file writer when dropped and must
/// outlive the program.
pub fn setup_logging() -> Result<Option<WorkerGuard>> {
    let session_dir = log_directory().join(session_id());
    let dir_error = std::fs::create_dir_all(&session_dir).err();

    let (file_layer, guard) = if dir_error.is_none() {
        let file_appender = tracing_appender::rolling::never(&session_dir, "hero.log");
        let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_file)
            .with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    match dir_error {
        None => tracing::info!(dir = %session_dir.display(), "logging initialized"),
        Some(err) => tracing::warn!(
            dir = %session_dir.display(),
            %err,
            "log directory unavailable, logging to stderr only"
        ),
    }
    Ok(guard)
}

/// `HERO_LOG_DIR`, else the platform cache directory.
fn log_directory() -> PathBuf {
    if let Some(dir) = std::env::var_os("HERO_LOG_DIR").filter(|dir| !dir.is_empty()) {
        return PathBuf::from(dir);
    }
    directories::ProjectDirs::from("", "", "hero")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("hero").join("logs"))
}

fn session_id() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    format!("session_{secs}")
}

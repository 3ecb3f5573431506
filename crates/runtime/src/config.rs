//! Runtime configuration loaded from the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Knobs of the clock-driven battle loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Engine ticks per second.
    pub tick_rate: u32,
    /// Seed of the battle RNG. A random seed is drawn when unset.
    pub seed: Option<u64>,
    /// Buffer size of every event bus topic.
    pub event_capacity: usize,
    /// Stop after this many ticks even if the battle is not over.
    pub max_ticks: Option<u64>,
    /// Content directory; the built-in content is used when unset.
    pub content_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_rate: Self::DEFAULT_TICK_RATE,
            seed: None,
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
            max_ticks: None,
            content_dir: None,
        }
    }
}

impl RuntimeConfig {
    pub const DEFAULT_TICK_RATE: u32 = 60;
    pub const DEFAULT_EVENT_CAPACITY: usize = 256;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `HERO_TICK_RATE` - ticks per second (default: 60)
    /// - `HERO_SEED` - RNG seed (default: random)
    /// - `HERO_EVENT_CAPACITY` - per-topic event buffer (default: 256)
    /// - `HERO_MAX_TICKS` - tick budget (default: unlimited)
    /// - `HERO_CONTENT_DIR` - content directory (default: built-in content)
    ///
    /// Unparsable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(rate) = read::<u32>(&lookup, "HERO_TICK_RATE") {
            config.tick_rate = rate.max(1);
        }
        config.seed = read(&lookup, "HERO_SEED");
        if let Some(capacity) = read::<usize>(&lookup, "HERO_EVENT_CAPACITY") {
            config.event_capacity = capacity.max(1);
        }
        config.max_ticks = read(&lookup, "HERO_MAX_TICKS");
        config.content_dir = lookup("HERO_CONTENT_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        config
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.tick_rate.max(1)))
    }

    /// The configured seed, or a fresh random one.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

fn read<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable environment variable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(RuntimeConfig::from_lookup(lookup(&[])), RuntimeConfig::default());
    }

    #[test]
    fn variables_override_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("HERO_TICK_RATE", "30"),
            ("HERO_SEED", "42"),
            ("HERO_EVENT_CAPACITY", "0"),
            ("HERO_MAX_TICKS", "900"),
            ("HERO_CONTENT_DIR", "/srv/content"),
        ]));
        assert_eq!(config.tick_rate, 30);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.event_capacity, 1);
        assert_eq!(config.max_ticks, Some(900));
        assert_eq!(config.content_dir, Some(PathBuf::from("/srv/content")));
        assert_eq!(config.resolve_seed(), 42);
    }

    #[test]
    fn garbage_is_ignored() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("HERO_TICK_RATE", "fast"),
            ("HERO_SEED", "-1"),
        ]));
        assert_eq!(config.tick_rate, RuntimeConfig::DEFAULT_TICK_RATE);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn interval_follows_tick_rate() {
        let config = RuntimeConfig {
            tick_rate: 50,
            ..RuntimeConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(20));
    }
}

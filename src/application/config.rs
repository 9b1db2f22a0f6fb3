use std::path::{Path, PathBuf};
use std::time::Duration;

/// Entries listed in the history view unless overridden
pub const DEFAULT_HISTORY_COUNT: usize = 30;

pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub history_count: usize,
    /// Artificial delay before every store call, for exercising loading states
    pub simulated_latency: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config for `data_dir` with every other setting at its default
    pub fn for_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::from_lookup(|key| {
            (key == "LINEDIET_DIR").then(|| data_dir.as_ref().display().to_string())
        })
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("LINEDIET_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::data_local_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("linediet")
            });

        let db_path = data_dir.join("linediet.db");

        let history_count = lookup("LINEDIET_HISTORY_COUNT")
            .and_then(|value| match value.parse::<usize>() {
                Ok(count) => Some(count),
                Err(e) => {
                    log::warn!("Ignoring LINEDIET_HISTORY_COUNT={value:?}: {e}");
                    None
                }
            })
            .unwrap_or(DEFAULT_HISTORY_COUNT);

        let simulated_latency = lookup("LINEDIET_SIMULATE_LATENCY_MS").and_then(|value| {
            match value.parse::<u64>() {
                Ok(0) => None,
                Ok(ms) => Some(Duration::from_millis(ms)),
                Err(e) => {
                    log::warn!("Ignoring LINEDIET_SIMULATE_LATENCY_MS={value:?}: {e}");
                    None
                }
            }
        });

        Self {
            data_dir,
            db_path,
            history_count,
            simulated_latency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert!(config.data_dir.ends_with("linediet"));
        assert_eq!(config.db_path, config.data_dir.join("linediet.db"));
        assert_eq!(config.history_count, DEFAULT_HISTORY_COUNT);
        assert_eq!(config.simulated_latency, None);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("LINEDIET_DIR", "/tmp/weights"),
            ("LINEDIET_HISTORY_COUNT", "7"),
            ("LINEDIET_SIMULATE_LATENCY_MS", "250"),
        ]);
        assert_eq!(config.db_path, PathBuf::from("/tmp/weights/linediet.db"));
        assert_eq!(config.history_count, 7);
        assert_eq!(config.simulated_latency, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[
            ("LINEDIET_HISTORY_COUNT", "lots"),
            ("LINEDIET_SIMULATE_LATENCY_MS", "-5"),
        ]);
        assert_eq!(config.history_count, DEFAULT_HISTORY_COUNT);
        assert_eq!(config.simulated_latency, None);
    }

    #[test]
    fn test_for_dir() {
        let config = Config::for_dir("/data/me");
        assert_eq!(config.db_path, PathBuf::from("/data/me/linediet.db"));
    }
}

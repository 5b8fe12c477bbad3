use crate::app_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_FAST_WPM_THRESHOLD: f64 = 40.0;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 50;

/// User tunable settings. Unknown or missing fields fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Results strictly above this wpm get `fast_message`
    pub fast_wpm_threshold: f64,
    pub fast_message: String,
    pub slow_message: String,
    /// Refresh interval of the running timer
    pub tick_interval_ms: u64,
    /// Sentences to draw from instead of the built-in list
    pub sentences: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fast_wpm_threshold: DEFAULT_FAST_WPM_THRESHOLD,
            fast_message: "You're faster than 70% of users!".to_string(),
            slow_message: "Keep practicing!".to_string(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            sentences: Vec::new(),
        }
    }
}

impl Config {
    /// Message shown next to a result
    pub fn verdict(&self, wpm: f64) -> &str {
        if wpm > self.fast_wpm_threshold {
            &self.fast_message
        } else {
            &self.slow_message
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => {
                    debug!(path = %self.path.display(), "config loaded");
                    return cfg;
                }
                Err(e) => warn!(path = %self.path.display(), error = %e, "invalid config, using defaults"),
            },
            Err(e) => debug!(path = %self.path.display(), error = %e, "no config file"),
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_survives_save() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        store.save(&Config::default()).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.tick_interval(), Duration::from_millis(DEFAULT_TICK_INTERVAL_MS));
        assert_eq!(loaded.fast_wpm_threshold, DEFAULT_FAST_WPM_THRESHOLD);
        assert!(loaded.sentences.is_empty());
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sub").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            fast_wpm_threshold: 65.0,
            fast_message: "Quick!".into(),
            slow_message: "Again".into(),
            tick_interval_ms: 100,
            sentences: vec!["one two".into(), "three four".into()],
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_or_corrupt_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, "{ nope").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"fast_wpm_threshold": 55.5}"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.fast_wpm_threshold, 55.5);
        assert_eq!(cfg.tick_interval_ms, DEFAULT_TICK_INTERVAL_MS);
        assert_eq!(cfg.slow_message, Config::default().slow_message);
    }

    #[test]
    fn verdict_uses_strict_threshold() {
        let cfg = Config::default();
        assert_eq!(cfg.verdict(40.1), "You're faster than 70% of users!");
        assert_eq!(cfg.verdict(40.0), "Keep practicing!");
        assert_eq!(cfg.verdict(0.0), "Keep practicing!");
    }

    #[test]
    fn tick_interval_never_zero() {
        let cfg = Config {
            tick_interval_ms: 0,
            ..Config::default()
        };
        assert_eq!(cfg.tick_interval(), Duration::from_millis(1));
    }
}

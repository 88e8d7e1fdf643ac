use crate::engine::{Difficulty, StopOnError};
use crate::words::{Language, QuoteLength};
use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display, strum_macros::EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    #[default]
    Time,
    Words,
    Quote,
    Zen,
}

/// All user-tunable knobs, persisted as one JSON record. The engine only
/// ever sees `stop_on_error`, `freedom_mode` and `difficulty`; the rest
/// drives target generation and presentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub mode: Mode,
    pub duration: u64,
    pub word_count: usize,
    pub language: Language,
    pub punctuation: bool,
    pub numbers: bool,
    pub difficulty: Difficulty,
    pub stop_on_error: StopOnError,
    pub freedom_mode: bool,
    pub quote_length: QuoteLength,
    pub live_wpm: bool,
    pub live_accuracy: bool,
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Time,
            duration: 30,
            word_count: 50,
            language: Language::English,
            punctuation: false,
            numbers: false,
            difficulty: Difficulty::Normal,
            stop_on_error: StopOnError::Off,
            freedom_mode: false,
            quote_length: QuoteLength::Medium,
            live_wpm: true,
            live_accuracy: true,
            theme: "dark".to_string(),
        }
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
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "tapr") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("tapr_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        // Missing or corrupt file falls back to defaults.
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
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
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            mode: Mode::Quote,
            duration: 60,
            word_count: 25,
            language: Language::English1k,
            punctuation: true,
            numbers: true,
            difficulty: Difficulty::Expert,
            stop_on_error: StopOnError::Word,
            freedom_mode: true,
            quote_length: QuoteLength::Long,
            live_wpm: false,
            live_accuracy: false,
            theme: "light".into(),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, b"{not json").unwrap();
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn enum_fields_serialize_lowercase() {
        let cfg = Config::default();
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"mode\":\"time\""));
        assert!(json.contains("\"stop_on_error\":\"off\""));
        assert!(json.contains("\"difficulty\":\"normal\""));
        assert!(json.contains("\"quote_length\":\"medium\""));
    }
}

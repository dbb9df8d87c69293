use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_dirs::AppDirs;
use crate::ladder::Difficulty;

/// What to do when the dictionary cannot answer a validation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Reject the move with `MoveError::ValidationUnavailable`.
    #[default]
    FailClosed,
    /// Accept the move and log a warning.
    FailOpen,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub difficulty: Difficulty,
    pub sound_effects: bool,
    pub hints: bool,
    pub validation_policy: ValidationPolicy,
    pub time_attack_secs: u32,
    pub hint_limit: usize,
    pub dictionary_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            sound_effects: true,
            hints: true,
            validation_policy: ValidationPolicy::FailClosed,
            time_attack_secs: 60,
            hint_limit: 2,
            dictionary_timeout_ms: 3000,
        }
    }
}

impl Config {
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(sound_effects) = patch.sound_effects {
            self.sound_effects = sound_effects;
        }
        if let Some(hints) = patch.hints {
            self.hints = hints;
        }
    }

    pub fn dictionary_timeout(&self) -> Duration {
        Duration::from_millis(self.dictionary_timeout_ms)
    }
}

/// Partial update of the player-facing settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub difficulty: Option<Difficulty>,
    pub sound_effects: Option<bool>,
    pub hints: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.difficulty.is_none() && self.sound_effects.is_none() && self.hints.is_none()
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
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => tracing::warn!(path = %self.path.display(), "Ignoring invalid config: {e}"),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

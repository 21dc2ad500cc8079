use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::game::{ObstaclePolicy, TokenSet, DEFAULT_COLS, DEFAULT_ROWS, MAX_COLS, MAX_ROWS};

/// Board dimensions and obstacle seeding.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub cols: usize,
    pub rows: usize,
    /// Chance that a new game gets `obstacle_count` obstacles.
    pub obstacle_chance: f64,
    pub obstacle_count: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            obstacle_chance: 0.2,
            obstacle_count: 1,
        }
    }
}

impl BoardConfig {
    pub fn obstacle_policy(&self) -> ObstaclePolicy {
        ObstaclePolicy::Chance {
            probability: self.obstacle_chance,
            count: self.obstacle_count,
        }
    }
}

/// Timing and forum behaviour of the match controller and its poll loop.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Seconds without an accepted move before the due player forfeits.
    pub inactivity_timeout_secs: u64,
    pub poll_interval_ms: u64,
    /// Pause between the end of one match and the next thread.
    pub restart_delay_secs: u64,
    pub thread_title: String,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            inactivity_timeout_secs: 5 * 60,
            poll_interval_ms: 2000,
            restart_delay_secs: 60,
            thread_title: "[BOT] Connect Four".to_string(),
            retry_attempts: 5,
            retry_delay_ms: 1000,
        }
    }
}

impl ControllerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_secs(self.restart_delay_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub board: BoardConfig,
    pub controller: ControllerConfig,
    pub tokens: TokenSet,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.cols == 0 || self.board.cols > MAX_COLS {
            return Err(ConfigError::Validation(format!(
                "board.cols must be in 1..={MAX_COLS}"
            )));
        }
        if self.board.rows == 0 || self.board.rows > MAX_ROWS {
            return Err(ConfigError::Validation(format!(
                "board.rows must be in 1..={MAX_ROWS}"
            )));
        }
        if !(0.0..=1.0).contains(&self.board.obstacle_chance) {
            return Err(ConfigError::Validation(
                "board.obstacle_chance must be in [0, 1]".into(),
            ));
        }
        if self.controller.inactivity_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "controller.inactivity_timeout_secs must be > 0".into(),
            ));
        }
        if self.controller.retry_attempts == 0 {
            return Err(ConfigError::Validation(
                "controller.retry_attempts must be >= 1".into(),
            ));
        }
        if self.controller.thread_title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "controller.thread_title must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}

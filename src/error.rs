use std::path::PathBuf;

use crate::forum::{PostId, ThreadId};
use crate::game::{MoveError, PlayerId};

/// Errors that can occur when building a new game.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("invalid board dimensions {cols}x{rows}")]
    InvalidDimensions { cols: usize, rows: usize },

    #[error("player {} has an empty name", .0.number())]
    EmptyPlayerName(PlayerId),
}

/// Failures the match controller cannot recover from.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("failed to start game: {0}")]
    Setup(#[from] SetupError),

    #[error("unexpected engine failure: {0}")]
    Engine(MoveError),
}

/// Errors reported by a forum backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForumError {
    #[error("thread {0} not found")]
    ThreadNotFound(ThreadId),

    #[error("post {0} not found")]
    PostNotFound(PostId),

    #[error("forum request failed: {0}")]
    Transient(String),
}

impl ForumError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ForumError::Transient(_))
    }
}

/// Errors that end a match runner.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("match error: {0}")]
    Match(#[from] MatchError),

    #[error("forum error: {0}")]
    Forum(#[from] ForumError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

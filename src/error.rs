use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the glimpse environment and its collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Failed to load sample {path:?}: {reason}")]
    SampleLoad { path: PathBuf, reason: String },

    #[error("Expected a {expected}-channel image, found {found} channels")]
    Shape { expected: usize, found: usize },

    #[error("Dataset cursor exhausted after {limit} resets")]
    Exhausted { limit: u64 },

    #[error("No active episode: call reset() before step()")]
    EpisodeNotActive,
}

/// Convenience alias for results carrying an [`EnvError`].
pub type Result<T> = std::result::Result<T, EnvError>;

use thiserror::Error;

/// Unified error type for version resolution
#[derive(Error, Debug)]
pub enum NextVerError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Parse(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Cache corruption: {0}")]
    CacheCorruption(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-nextver
pub type Result<T> = std::result::Result<T, NextVerError>;

impl NextVerError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        NextVerError::Config(msg.into())
    }

    /// Create a version parsing error with context
    pub fn parse(msg: impl Into<String>) -> Self {
        NextVerError::Parse(msg.into())
    }

    /// Create a repository error with context
    pub fn repository(msg: impl Into<String>) -> Self {
        NextVerError::Repository(msg.into())
    }

    /// Create a cache corruption error with context
    pub fn cache_corruption(msg: impl Into<String>) -> Self {
        NextVerError::CacheCorruption(msg.into())
    }
}

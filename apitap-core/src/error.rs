use thiserror::Error;

/// Unified error type for apitap.
#[derive(Error, Debug)]
pub enum ApitapError {
    #[error("Log entry not found: {0}")]
    EntryNotFound(u64),

    #[error("Could not save log entry: {0}")]
    Save(#[source] anyhow::Error),

    #[error("Could not delete log entry: {0}")]
    Delete(#[source] anyhow::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal: {0}")]
    Internal(String),
}

impl ApitapError {
    /// True for conditions a caller can surface as HTTP 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApitapError::EntryNotFound(_))
    }
}

use thiserror::Error;

/// Storage operation error.
///
/// These are infrastructure failures, as opposed to the domain errors a
/// user can trigger with bad input.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed value under '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub fn serialization(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            key: key.into(),
            source,
        }
    }
}

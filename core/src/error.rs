use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unreadable delimited text in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid pipeline config: {reason}")]
    InvalidConfig { reason: String },
}

impl TransformError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TransformError::Io { path: path.into(), source }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        TransformError::Csv { path: path.into(), source }
    }
}

pub type TransformResult<T> = Result<T, TransformError>;

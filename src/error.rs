//! Error types for the invex index engine

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{path}: {source}")]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Data corruption: {0}")]
    Corruption(String),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("malformed postings for term {term_id} at offset {offset}: {reason}")]
    MalformedPostings {
        term_id: u32,
        offset: u64,
        reason: String,
    },

    #[error("Index build error: {0}")]
    Build(String),

    #[error("term {0} not present in index")]
    TermNotFound(u32),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<bincode::Error> for IndexError {
    fn from(err: bincode::Error) -> Self {
        IndexError::Serialization(err.to_string())
    }
}

impl IndexError {
    /// Attach the offending path to a raw IO error.
    pub(crate) fn at_path(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IndexError::Path {
            path: path.into(),
            source,
        }
    }
}

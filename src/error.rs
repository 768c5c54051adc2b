//! Error types for document intake, configuration and report rendering

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LexplainError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to render report: {0}")]
    Render(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LexplainError>;

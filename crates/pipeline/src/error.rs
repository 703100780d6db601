use crate::executor::BlockFailure;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {failure}", path.display())]
    BlockExhausted {
        path: PathBuf,
        #[source]
        failure: BlockFailure,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid executor options: {0}")]
    InvalidOptions(String),

    #[error("Output directory is locked by another run ({})", .0.display())]
    Locked(PathBuf),

    #[error("{0}")]
    Other(String),
}

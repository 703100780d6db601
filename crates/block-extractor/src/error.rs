use std::path::PathBuf;
use thiserror::Error;

/// Result type for extractor operations
pub type Result<T> = std::result::Result<T, ExtractorError>;

/// Errors raised while loading header text.
///
/// Extraction itself never fails: text without any match yields an empty block
/// list.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The header could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractorError {
    /// Create a read error for `path`
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the atlas-checker library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reference catalog file missing or unreadable
    #[error("catalog file not found: {0}")]
    CatalogNotFound(PathBuf),

    /// Reference catalog contains a row that cannot be used
    #[error("invalid catalog {path}: {detail}")]
    CatalogParse { path: PathBuf, detail: String },

    /// Scan root missing or not a directory
    #[error("invalid root path: {0}")]
    InvalidRootPath(PathBuf),

    /// A matched label directory could not be listed
    #[error("cannot list directory {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

//! Error types for gfmdoc library.

use std::io;
use thiserror::Error;

/// Result type alias for gfmdoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while rendering and writing pages.
///
/// Only page-fatal conditions are errors. A content node the renderer cannot
/// handle is logged and skipped instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when writing output or copying resources.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No output path could be resolved for a page.
    #[error("Cannot resolve path for {0}")]
    UnresolvedPath(String),

    /// A page is neither a content page nor renderer specific.
    #[error(
        "Page {0} cannot be rendered by renderer as it is not renderer specific nor contains content"
    )]
    MalformedPage(String),

    /// Error reading or writing the content tree as JSON.
    #[error("JSON error: {0}")]
    Json(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

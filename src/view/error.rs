//! View error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("view `{0}` not found")]
    NotFound(String),

    #[error("failed to read view `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}

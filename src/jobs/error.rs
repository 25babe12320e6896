//! Job error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to write `{0}`")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("failed to read backup directory `{0}`")]
    ListDumps(PathBuf, #[source] std::io::Error),

    #[error("failed to remove old dump `{0}`")]
    Prune(PathBuf, #[source] std::io::Error),

    #[error("no dump named `{0}`")]
    MissingDump(PathBuf),

    #[error("invalid dump name `{0}`")]
    InvalidDumpName(String),

    #[error("{0:#}")]
    Command(anyhow::Error),
}

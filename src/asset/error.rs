//! Asset index errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("cannot list asset folder `{0}`")]
    ListDir(PathBuf, #[source] std::io::Error),

    #[error("failed to watch asset folder `{0}`")]
    Watch(PathBuf, #[source] notify::Error),

    #[error("asset rebuild task stopped")]
    TaskAborted,
}

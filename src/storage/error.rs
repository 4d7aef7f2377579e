use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to list {}: {}", .0.display(), .1)]
    Walk(PathBuf, #[source] walkdir::Error),

    #[error("filesystem error: {0}")]
    Fs(#[from] std::io::Error),

    #[error("manifest {} is invalid: {}", .0.display(), .1)]
    InvalidManifest(PathBuf, #[source] serde_json::Error),

    #[error("capacity of {0} minutes is not usable")]
    InvalidCapacity(f64),

    #[error("could not read duration of {}: {:#}", .0.display(), .1)]
    Duration(PathBuf, anyhow::Error),
}

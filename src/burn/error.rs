use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BurnError {
    #[error("failed to run the burner in {}: {}", .0.display(), .1)]
    Invoke(PathBuf, #[source] std::io::Error),
}

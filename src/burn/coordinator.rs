use std::path::PathBuf;

use log::{debug, info, warn};

use crate::{
    burn::{
        error::BurnError,
        executable::Burner,
        planner::{BurnSet, PlannedTrack},
        status::BurnStatus,
    },
    domain::run::common_parent,
};

/// Final state of a burn run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnOutcome {
    pub status: BurnStatus,
    /// subset of the last invocation
    pub files: Vec<PlannedTrack>,
    pub attempts: usize,
}

/// Drives the burner, dropping the last track each time the selection
/// does not fit the media.
pub struct BurnCoordinator<'a> {
    burner: &'a dyn Burner,
}

impl<'a> BurnCoordinator<'a> {
    pub fn new(burner: &'a dyn Burner) -> Self {
        Self { burner }
    }

    pub fn burn(&self, set: BurnSet) -> Result<BurnOutcome, BurnError> {
        let BurnSet {
            directory,
            mut files,
        } = set;
        let mut attempts = 0;
        let mut status = BurnStatus::Pending;

        loop {
            let paths: Vec<PathBuf> = files.iter().map(|t| t.path.clone()).collect();
            let working_dir = common_parent(&paths)
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| directory.clone());

            attempts += 1;
            let code = self
                .burner
                .invoke(&working_dir, &paths)
                .map_err(|e| BurnError::Invoke(working_dir.clone(), e))?;

            let next = BurnStatus::from_exit_code(code);
            debug!("attempt {attempts}: {status} -> {next}");
            status = next;

            match status {
                BurnStatus::CapacityExceeded if !files.is_empty() => {
                    if let Some(dropped) = files.pop() {
                        info!(
                            "selection too long for the media, dropping {}",
                            dropped.path.display()
                        );
                    }
                }
                // an empty selection cannot shrink further
                BurnStatus::CapacityExceeded => {
                    warn!("burner rejected an empty selection");
                    break;
                }
                BurnStatus::Success | BurnStatus::Fatal(_) | BurnStatus::Pending => break,
            }
        }

        Ok(BurnOutcome {
            status,
            files,
            attempts,
        })
    }
}

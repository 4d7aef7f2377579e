//! Chooses the tracks that fit on one disc

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use log::debug;

use crate::{
    media::probe::DurationProbe,
    storage::{error::StorageError, manifest::Manifest},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTrack {
    pub path: PathBuf,
    pub duration: Duration,
}

/// Ordered files submitted to the burner in one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnSet {
    pub directory: PathBuf,
    pub files: Vec<PlannedTrack>,
}

impl BurnSet {
    pub fn total_duration(&self) -> Duration {
        self.files.iter().map(|t| t.duration).sum()
    }
}

/// Disc capacity as a duration. Negative, NaN and out-of-range values are
/// rejected.
pub fn capacity_budget(capacity_minutes: f64) -> Result<Duration, StorageError> {
    if capacity_minutes.is_nan() || capacity_minutes < 0.0 {
        return Err(StorageError::InvalidCapacity(capacity_minutes));
    }
    Duration::try_from_secs_f64(capacity_minutes * 60.0)
        .map_err(|_| StorageError::InvalidCapacity(capacity_minutes))
}

/// Longest prefix of `tracks` whose total stays within `budget`.
/// The first track that overflows ends the prefix.
pub fn fit_prefix(tracks: Vec<PlannedTrack>, budget: Duration) -> Vec<PlannedTrack> {
    let mut total = Duration::ZERO;
    let mut fitted = Vec::new();
    for track in tracks {
        if total + track.duration > budget {
            debug!(
                "{} would exceed capacity, stopping",
                track.path.display()
            );
            break;
        }
        total += track.duration;
        fitted.push(track);
    }
    fitted
}

pub struct CapacityPlanner<'a> {
    probe: &'a dyn DurationProbe,
}

impl<'a> CapacityPlanner<'a> {
    pub fn new(probe: &'a dyn DurationProbe) -> Self {
        Self { probe }
    }

    /// Plans from the directory's manifest, reconciled with the listing, or
    /// from the listing alone when there is no manifest.
    pub fn plan(&self, directory: &Path, capacity_minutes: f64) -> Result<BurnSet, StorageError> {
        let budget = capacity_budget(capacity_minutes)?;
        let mut manifest = match Manifest::load(directory)? {
            Some(manifest) => manifest,
            None => {
                debug!("no manifest in {}, reading the listing", directory.display());
                Manifest::default()
            }
        };
        manifest.reconcile(directory, self.probe)?;

        let tracks = manifest
            .tracks
            .into_iter()
            .map(|entry| PlannedTrack {
                path: directory.join(&entry.file_name),
                duration: entry.duration(),
            })
            .collect();

        Ok(BurnSet {
            directory: directory.to_path_buf(),
            files: fit_prefix(tracks, budget),
        })
    }
}

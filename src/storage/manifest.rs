//! Ordered record of the tracks acquired into a directory

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    media::probe::DurationProbe,
    storage::{error::StorageError, fs::list_tracks},
};

pub const MANIFEST_FILE: &str = "manifest.json";
const MANIFEST_VERSION: u32 = 1;

/// Request that produced an entry; absent when rebuilt from a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySource {
    pub artist: String,
    pub song: String,
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub order_index: usize,
    pub file_name: String,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<EntrySource>,
}

impl ManifestEntry {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    /// sorted by file name, i.e. playback order
    pub tracks: Vec<ManifestEntry>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            version: MANIFEST_VERSION,
            created_at: Utc::now(),
            tracks: Vec::new(),
        }
    }
}

pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILE)
}

impl Manifest {
    /// `None` when the directory has no manifest
    pub fn load(dir: &Path) -> Result<Option<Manifest>, StorageError> {
        let path = manifest_path(dir);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read(&path)?;
        serde_json::from_slice(&contents)
            .map(Some)
            .map_err(|e| StorageError::InvalidManifest(path, e))
    }

    pub fn save(&self, dir: &Path) -> Result<(), StorageError> {
        let path = manifest_path(dir);
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| StorageError::InvalidManifest(path.clone(), e))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Adds an entry, replacing any previous one with the same order index.
    pub fn record(&mut self, entry: ManifestEntry) {
        self.tracks.retain(|t| t.order_index != entry.order_index);
        self.tracks.push(entry);
        self.tracks.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    }

    /// Rebuilds a manifest from the music files present in `dir`.
    pub fn from_directory(dir: &Path, probe: &dyn DurationProbe) -> Result<Manifest, StorageError> {
        let mut manifest = Manifest::default();
        manifest.reconcile(dir, probe)?;
        Ok(manifest)
    }

    /// Brings the manifest in line with the music files in `dir`: entries
    /// whose file is gone are dropped, files without an entry are probed and
    /// added. Afterwards planning from the manifest and from the listing agree.
    pub fn reconcile(&mut self, dir: &Path, probe: &dyn DurationProbe) -> Result<(), StorageError> {
        let on_disk = list_tracks(dir)?;
        let names: HashSet<String> = on_disk.iter().map(|p| file_name(p)).collect();

        self.tracks.retain(|t| {
            let present = names.contains(&t.file_name);
            if !present {
                warn!("{} is in the manifest but missing on disk", t.file_name);
            }
            present
        });

        let known: HashSet<String> = self.tracks.iter().map(|t| t.file_name.clone()).collect();
        for (position, path) in on_disk.iter().enumerate() {
            let name = file_name(path);
            if known.contains(&name) {
                continue;
            }
            let duration = probe
                .duration(path)
                .map_err(|e| StorageError::Duration(path.clone(), e))?;
            self.tracks.push(ManifestEntry {
                order_index: order_index_of(&name).unwrap_or(position + 1),
                file_name: name,
                duration_ms: duration.as_millis() as u64,
                source: None,
            });
        }

        self.tracks.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Leading `NN.` of a track file name
fn order_index_of(file_name: &str) -> Option<usize> {
    let (digits, _) = file_name.split_once('.')?;
    digits.parse().ok()
}

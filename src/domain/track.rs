use std::{path::PathBuf, time::Duration};

/// One requested song, in playback order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRequest {
    pub artist: String,
    pub song: String,
    /// 1-based, strictly increasing within a run
    pub order_index: usize,
    pub album: Option<String>,
}

/// A remote media item under evaluation as the source for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub identifier: String,
    pub title: String,
    pub description: String,
}

impl Candidate {
    /// Identity check: the artist name must appear (case-insensitive)
    /// in the title or the description.
    pub fn mentions_artist(&self, artist: &str) -> bool {
        let needle = artist.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

/// Audio-only stream offered by the media source.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDescriptor {
    pub format_id: String,
    /// container extension, e.g. `webm` or `m4a`
    pub container: String,
    /// kbit/s
    pub bitrate: f64,
}

/// A transcoded file on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquiredTrack {
    pub path: PathBuf,
    pub duration: Duration,
    pub order_index: usize,
}

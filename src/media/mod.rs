//! Contracts for the external media collaborators.

use std::path::Path;

use crate::domain::track::{Candidate, StreamDescriptor};

pub mod ffmpeg;
pub mod probe;
pub mod ytdlp;

/// Remote media catalogue: metadata, stream listing and download.
pub trait MediaSource {
    /// Fetches title and description for an identifier.
    fn describe(&self, identifier: &str) -> anyhow::Result<Candidate>;

    /// Audio-only streams available for the candidate.
    fn audio_streams(&self, candidate: &Candidate) -> anyhow::Result<Vec<StreamDescriptor>>;

    /// Downloads one stream to `dest`.
    fn download(
        &self,
        candidate: &Candidate,
        stream: &StreamDescriptor,
        dest: &Path,
    ) -> anyhow::Result<()>;
}

/// Converts a downloaded container into the normalized audio codec.
pub trait Transcoder {
    /// Extension of the files this transcoder produces.
    fn extension(&self) -> &str;

    fn transcode(&self, input: &Path, output: &Path) -> anyhow::Result<()>;
}

/// Picks the audio-only stream with the highest bitrate.
pub fn highest_bitrate(streams: &[StreamDescriptor]) -> Option<&StreamDescriptor> {
    streams
        .iter()
        .filter(|s| s.bitrate.is_finite())
        .max_by(|a, b| a.bitrate.total_cmp(&b.bitrate))
}

//! Downloads, transcodes and names verified tracks

use std::{
    io,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{
    domain::{run::track_file_name, track::Candidate},
    media::{MediaSource, Transcoder, highest_bitrate},
};

pub mod error;

use error::AcquireError;

/// Characters rejected by common filesystems.
const INVALID_FILE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Removes characters that cannot appear in a file name.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && !INVALID_FILE_NAME_CHARS.contains(c))
        .collect();
    cleaned
        .trim()
        .trim_end_matches(['.', ' '])
        .to_string()
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

pub struct TrackAcquirer<'a> {
    media: &'a dyn MediaSource,
    transcoder: &'a dyn Transcoder,
}

impl<'a> TrackAcquirer<'a> {
    pub fn new(media: &'a dyn MediaSource, transcoder: &'a dyn Transcoder) -> Self {
        Self { media, transcoder }
    }

    /// Downloads the best audio stream of `candidate` and transcodes it to
    /// `<dest_dir>/<NN>. <title>.<ext>`.
    ///
    /// On failure no temporary or partial file is left behind.
    pub fn acquire(
        &self,
        candidate: &Candidate,
        dest_dir: &Path,
        order_index: usize,
        total_count: usize,
    ) -> Result<PathBuf, AcquireError> {
        std::fs::create_dir_all(dest_dir)?;

        let streams = self
            .media
            .audio_streams(candidate)
            .map_err(AcquireError::Streams)?;
        let stream = highest_bitrate(&streams).ok_or_else(|| AcquireError::NoAudioStream {
            identifier: candidate.identifier.clone(),
        })?;
        debug!(
            "{}: using format {} ({} kbit/s {})",
            candidate.identifier, stream.format_id, stream.bitrate, stream.container
        );

        let mut title = sanitize_file_name(&candidate.title);
        if title.is_empty() {
            title = sanitize_file_name(&candidate.identifier);
        }

        let temp_path = dest_dir.join(format!("{title}.{}", stream.container));
        let final_path = dest_dir.join(track_file_name(
            order_index,
            total_count,
            &title,
            self.transcoder.extension(),
        ));

        if let Err(e) = self.media.download(candidate, stream, &temp_path) {
            remove_if_exists(&temp_path)?;
            return Err(AcquireError::Download(e));
        }

        if let Err(e) = self.transcoder.transcode(&temp_path, &final_path) {
            // both removals run before the first failure is reported
            let temp = remove_if_exists(&temp_path);
            let output = remove_if_exists(&final_path);
            temp.and(output)?;
            return Err(AcquireError::Transcode(e));
        }

        std::fs::remove_file(&temp_path)?;
        info!("saved {}", final_path.display());
        Ok(final_path)
    }
}

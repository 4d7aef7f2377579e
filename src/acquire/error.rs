use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("could not list streams: {0:#}")]
    Streams(anyhow::Error),

    #[error("no audio-only stream for {identifier}")]
    NoAudioStream { identifier: String },

    #[error("download failed: {0:#}")]
    Download(anyhow::Error),

    #[error("transcode failed: {0:#}")]
    Transcode(anyhow::Error),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

impl AcquireError {
    /// Directory I/O failures stop the run, anything else only skips the track.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AcquireError::Io(_))
    }
}

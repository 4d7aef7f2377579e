use std::{path::Path, path::PathBuf, process::Command};

use anyhow::{Context, bail};
use log::debug;

use super::Transcoder;
use crate::config::OutputConfig;

/// Transcodes with the `ffmpeg` executable.
pub struct Ffmpeg {
    executable: PathBuf,
    codec: String,
    quality: String,
    extension: String,
}

impl Ffmpeg {
    pub fn new(executable: PathBuf, output: &OutputConfig) -> Self {
        Self {
            executable,
            codec: output.codec.clone(),
            quality: output.quality.clone(),
            extension: output.extension.clone(),
        }
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(input)
            .args(["-vn", "-codec:a", &self.codec, "-q:a", &self.quality])
            .arg(output);
        cmd
    }
}

impl Transcoder for Ffmpeg {
    fn extension(&self) -> &str {
        &self.extension
    }

    fn transcode(&self, input: &Path, output: &Path) -> anyhow::Result<()> {
        debug!("transcoding {} -> {}", input.display(), output.display());
        let out = self
            .command(input, output)
            .output()
            .with_context(|| format!("failed to run {}", self.executable.display()))?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            bail!("ffmpeg failed on {}: {}", input.display(), stderr.trim());
        }
        Ok(())
    }
}

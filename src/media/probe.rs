use std::{path::Path, time::Duration};

use anyhow::Context;
use lofty::prelude::AudioFile;

/// Reads the playback duration of an audio file.
pub trait DurationProbe {
    fn duration(&self, path: &Path) -> anyhow::Result<Duration>;
}

/// Reads container properties with `lofty`.
pub struct LoftyProbe;

impl DurationProbe for LoftyProbe {
    fn duration(&self, path: &Path) -> anyhow::Result<Duration> {
        let tagged = lofty::read_from_path(path)
            .with_context(|| format!("failed to read audio properties of {}", path.display()))?;
        Ok(tagged.properties().duration())
    }
}

//! `yt-dlp` backed media source

use std::{
    cell::RefCell,
    collections::HashMap,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, bail};
use log::debug;
use serde::Deserialize;

use super::MediaSource;
use crate::domain::track::{Candidate, StreamDescriptor};

#[derive(Debug, Clone, Deserialize)]
struct VideoInfo {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    formats: Vec<FormatInfo>,
}

#[derive(Debug, Clone, Deserialize)]
struct FormatInfo {
    format_id: String,
    #[serde(default)]
    ext: String,
    vcodec: Option<String>,
    acodec: Option<String>,
    abr: Option<f64>,
    tbr: Option<f64>,
}

impl FormatInfo {
    fn is_audio_only(&self) -> bool {
        self.vcodec.as_deref() == Some("none")
            && self.acodec.as_deref().is_some_and(|c| c != "none")
    }
}

impl VideoInfo {
    fn candidate(&self) -> Candidate {
        Candidate {
            identifier: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone().unwrap_or_default(),
        }
    }

    fn audio_streams(&self) -> Vec<StreamDescriptor> {
        self.formats
            .iter()
            .filter(|f| f.is_audio_only())
            .map(|f| StreamDescriptor {
                format_id: f.format_id.clone(),
                container: f.ext.clone(),
                bitrate: f.abr.or(f.tbr).unwrap_or(0.0),
            })
            .collect()
    }
}

fn parse_info(json: &[u8]) -> anyhow::Result<VideoInfo> {
    serde_json::from_slice(json).with_context(|| "failed to parse yt-dlp metadata")
}

/// yt-dlp treats `%` in output paths as template syntax
fn escape_output_template(path: &Path) -> String {
    path.to_string_lossy().replace('%', "%%")
}

pub struct YtDlp {
    executable: PathBuf,
    watch_url: String,
    infos: RefCell<HashMap<String, VideoInfo>>,
}

impl YtDlp {
    pub fn new(executable: PathBuf, watch_url: String) -> Self {
        Self {
            executable,
            watch_url,
            infos: RefCell::new(HashMap::new()),
        }
    }

    fn url(&self, identifier: &str) -> String {
        format!("{}{identifier}", self.watch_url)
    }

    fn info(&self, identifier: &str) -> anyhow::Result<VideoInfo> {
        if let Some(info) = self.infos.borrow().get(identifier) {
            return Ok(info.clone());
        }

        debug!("fetching metadata for {identifier}");
        let out = Command::new(&self.executable)
            .args(["-J", "--no-playlist", "--skip-download"])
            .arg(self.url(identifier))
            .output()
            .with_context(|| format!("failed to run {}", self.executable.display()))?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            bail!("yt-dlp failed for {identifier}: {}", stderr.trim());
        }

        let info = parse_info(&out.stdout)?;
        self.infos
            .borrow_mut()
            .insert(identifier.to_string(), info.clone());
        Ok(info)
    }
}

impl MediaSource for YtDlp {
    fn describe(&self, identifier: &str) -> anyhow::Result<Candidate> {
        Ok(self.info(identifier)?.candidate())
    }

    fn audio_streams(&self, candidate: &Candidate) -> anyhow::Result<Vec<StreamDescriptor>> {
        Ok(self.info(&candidate.identifier)?.audio_streams())
    }

    fn download(
        &self,
        candidate: &Candidate,
        stream: &StreamDescriptor,
        dest: &Path,
    ) -> anyhow::Result<()> {
        debug!(
            "downloading {} format {} to {}",
            candidate.identifier,
            stream.format_id,
            dest.display()
        );
        let out = Command::new(&self.executable)
            .args(["--no-playlist", "--no-part", "--quiet", "-f"])
            .arg(&stream.format_id)
            .arg("-o")
            .arg(escape_output_template(dest))
            .arg(self.url(&candidate.identifier))
            .output()
            .with_context(|| format!("failed to run {}", self.executable.display()))?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            bail!("download of {} failed: {}", candidate.identifier, stderr.trim());
        }
        Ok(())
    }
}

use anyhow::Context;
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

use crate::retry::RetryPolicy;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub burn: BurnConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            output: Default::default(),
            search: Default::default(),
            reference: Default::default(),
            retry: Default::default(),
            http: Default::default(),
            tools: Default::default(),
            burn: Default::default(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read user config {path}"))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }

    /// Loads the config file, or falls back to defaults when there is none
    pub fn load_or_default(path: &str) -> anyhow::Result<Config> {
        if std::path::Path::new(path).exists() {
            Self::load(path)
        } else {
            log::info!("No config at {path}, using defaults");
            Ok(Config::default())
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub working_dir: PathBuf,
    /// ffmpeg audio codec
    pub codec: String,
    pub extension: String,
    pub quality: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            codec: "libmp3lame".into(),
            extension: "mp3".into(),
            quality: "2".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub results_url: String,
    pub watch_url: String,
    pub min_identifier_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            results_url: "https://www.youtube.com/results?search_query=".into(),
            watch_url: "https://www.youtube.com/watch?v=".into(),
            min_identifier_len: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReferenceConfig {
    pub search_url: String,
    pub base_url: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            search_url: "https://en.wikipedia.org/w/index.php?fulltext=1&ns0=1&search=".into(),
            base_url: "https://en.wikipedia.org".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    pub retries: u32,
    pub delay_ms: u64,
}

impl From<RetrySettings> for RetryPolicy {
    fn from(s: RetrySettings) -> Self {
        RetryPolicy::new(s.retries, Duration::from_millis(s.delay_ms))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetryConfig {
    /// swapped-term retry when no identifier comes back
    pub search: RetrySettings,
    /// re-verification after an identity mismatch
    pub verify: RetrySettings,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            search: RetrySettings {
                retries: 1,
                delay_ms: 2000,
            },
            verify: RetrySettings {
                retries: 3,
                delay_ms: 2000,
            },
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("discburn/", env!("CARGO_PKG_VERSION")).into(),
            connect_timeout_secs: 5,
            read_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ToolsConfig {
    pub yt_dlp: PathBuf,
    pub ffmpeg: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            yt_dlp: PathBuf::from("yt-dlp"),
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BurnConfig {
    pub executable: PathBuf,
    /// flags placed before the per-track `-file:` flags
    pub args: Vec<String>,
    pub capacity_minutes: f64,
}

impl Default for BurnConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("cdbxpcmd"),
            args: vec!["--burn-audio".into(), "-device:0".into()],
            capacity_minutes: 80.0,
        }
    }
}

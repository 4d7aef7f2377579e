use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::acquire::TrackAcquirer;
use crate::burn::coordinator::BurnCoordinator;
use crate::burn::executable::BurnExecutable;
use crate::burn::planner::{BurnSet, CapacityPlanner, capacity_budget};
use crate::config::Config;
use crate::domain::run::RunContext;
use crate::http::HttpFetcher;
use crate::media::{ffmpeg::Ffmpeg, probe::LoftyProbe, ytdlp::YtDlp};
use crate::pipeline::{AcquisitionReport, Pipeline};
use crate::resolve::candidate::{CandidateResolver, ResolverSettings};
use crate::resolve::extract::{MediaWikiMarkers, VideoIdMarker};
use crate::resolve::input::{InputResolver, InputSource};
use crate::resolve::tracklist::TrackListScraper;
use crate::retry::ThreadSleeper;

#[derive(Parser)]
#[command(name = "discburn")]
#[command(version = "0.1")]
#[command(about = "Downloads a track list and burns it to an audio disc")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct InputArgs {
    /// Tab-separated `artist<TAB>song` list, or the album name when ARTIST is given
    pub source: String,

    /// Artist of the album; discovers the album's track list
    pub artist: Option<String>,

    /// Destination folder name instead of the artist
    #[arg(short, long)]
    pub folder: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the tracks, then burn as many as fit
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Disc capacity in minutes
        #[arg(long)]
        capacity_minutes: Option<f64>,
    },
    /// Download the tracks only
    Fetch {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Show which tracks of a directory fit on the disc
    Plan {
        dir: PathBuf,

        /// Disc capacity in minutes
        #[arg(long)]
        capacity_minutes: Option<f64>,
    },
    /// Burn the tracks of an existing directory
    Burn {
        dir: PathBuf,

        /// Disc capacity in minutes
        #[arg(long)]
        capacity_minutes: Option<f64>,
    },
}

/// Entrypoint for CLI, returns the process exit code
pub fn run() -> i32 {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            1
        }
    }
}

fn execute(cli: Cli) -> anyhow::Result<i32> {
    let cfg = Config::load_or_default(&cli.config.to_string_lossy())?;

    match cli.command {
        Commands::Run {
            input,
            capacity_minutes,
        } => {
            let capacity = capacity_minutes.unwrap_or(cfg.burn.capacity_minutes);
            // reject a bad capacity before downloading anything
            capacity_budget(capacity)?;
            let dir = fetch(&cfg, input)?;
            burn(&cfg, &dir, capacity)
        }

        Commands::Fetch { input } => {
            fetch(&cfg, input)?;
            Ok(0)
        }

        Commands::Plan {
            dir,
            capacity_minutes,
        } => {
            let capacity = capacity_minutes.unwrap_or(cfg.burn.capacity_minutes);
            let set = CapacityPlanner::new(&LoftyProbe).plan(&dir, capacity)?;
            print_plan(&set, capacity);
            Ok(0)
        }

        Commands::Burn {
            dir,
            capacity_minutes,
        } => {
            let capacity = capacity_minutes.unwrap_or(cfg.burn.capacity_minutes);
            burn(&cfg, &dir, capacity)
        }
    }
}

/// Acquisition stage, returns the directory the tracks went to
fn fetch(cfg: &Config, input: InputArgs) -> anyhow::Result<PathBuf> {
    let fetcher = HttpFetcher::new(&cfg.http);
    let media = YtDlp::new(cfg.tools.yt_dlp.clone(), cfg.search.watch_url.clone());
    let transcoder = Ffmpeg::new(cfg.tools.ffmpeg.clone(), &cfg.output);
    let sleeper = ThreadSleeper;

    let scraper = TrackListScraper::new(&fetcher, &MediaWikiMarkers, cfg.reference.clone());
    let source = InputSource::from_args(input.source, input.artist);
    let requests = InputResolver::new(&scraper).resolve(&source)?;

    let ctx = RunContext::for_run(
        &cfg.output.working_dir,
        input.folder.as_deref(),
        &source,
        &requests,
    );
    println!(
        "Fetching {} tracks into {}",
        requests.len(),
        ctx.track_dir().display()
    );

    let pipeline = Pipeline::new(
        CandidateResolver::new(
            &fetcher,
            &VideoIdMarker,
            &media,
            &sleeper,
            ResolverSettings::from_config(cfg),
        ),
        TrackAcquirer::new(&media, &transcoder),
        &LoftyProbe,
    );
    let report = pipeline.acquire_all(&requests, &ctx)?;
    print_report(&report);

    Ok(ctx.track_dir())
}

fn burn(cfg: &Config, dir: &Path, capacity_minutes: f64) -> anyhow::Result<i32> {
    let set = CapacityPlanner::new(&LoftyProbe).plan(dir, capacity_minutes)?;
    print_plan(&set, capacity_minutes);

    let burner = BurnExecutable::new(&cfg.burn);
    let outcome = BurnCoordinator::new(&burner).burn(set)?;

    println!(
        "Burn finished after {} attempt(s): {} ({} tracks)",
        outcome.attempts,
        outcome.status,
        outcome.files.len()
    );
    let code = outcome.status.exit_code();
    log::info!("burner final status {code} ({})", outcome.status);
    Ok(code)
}

fn print_report(report: &AcquisitionReport) {
    println!("Acquired {} tracks:", report.acquired.len());
    for track in &report.acquired {
        println!("    - [{}] {}", track.order_index, track.path.to_string_lossy());
    }
    if !report.skipped.is_empty() {
        println!("Skipped {} requests:", report.skipped.len());
        for (request, reason) in &report.skipped {
            println!(
                "    - {}. {} - {}: {reason}",
                request.order_index, request.artist, request.song
            );
        }
    }
}

fn print_plan(set: &BurnSet, capacity_minutes: f64) {
    let total = set.total_duration().as_secs();
    println!(
        "{} tracks fit in {capacity_minutes} minutes ({}:{:02} total):",
        set.files.len(),
        total / 60,
        total % 60
    );
    for track in &set.files {
        let secs = track.duration.as_secs();
        println!(
            "    - {} ({}:{:02})",
            track.path.to_string_lossy(),
            secs / 60,
            secs % 60
        );
    }
}

//! Acquisition stage: every request is resolved and acquired in turn

use std::path::Path;

use log::{info, warn};

use crate::{
    acquire::{TrackAcquirer, sanitize_file_name},
    domain::{
        run::RunContext,
        track::{AcquiredTrack, TrackRequest},
    },
    media::probe::DurationProbe,
    resolve::{
        candidate::{CandidateResolver, Resolution},
        input::InputSource,
    },
    storage::manifest::{EntrySource, Manifest, ManifestEntry},
};

const FALLBACK_FOLDER: &str = "discburn";

impl RunContext {
    /// Destination folder is the override, else the artist (the album's,
    /// or the first request's in list mode).
    pub fn for_run(
        working_dir: &Path,
        folder_override: Option<&str>,
        source: &InputSource,
        requests: &[TrackRequest],
    ) -> Self {
        let (artist, album) = match source {
            InputSource::Album { album, artist } => (Some(artist.as_str()), Some(album.as_str())),
            InputSource::List(_) => (requests.first().map(|r| r.artist.as_str()), None),
        };
        let folder = folder_override
            .or(artist)
            .map(sanitize_file_name)
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| FALLBACK_FOLDER.to_string());

        RunContext {
            working_dir: working_dir.to_path_buf(),
            folder,
            album: album.map(sanitize_file_name).filter(|a| !a.is_empty()),
            total_count: requests.len(),
        }
    }
}

#[derive(Debug, Default)]
pub struct AcquisitionReport {
    pub acquired: Vec<AcquiredTrack>,
    /// request and the reason it was skipped
    pub skipped: Vec<(TrackRequest, String)>,
}

pub struct Pipeline<'a> {
    resolver: CandidateResolver<'a>,
    acquirer: TrackAcquirer<'a>,
    probe: &'a dyn DurationProbe,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        resolver: CandidateResolver<'a>,
        acquirer: TrackAcquirer<'a>,
        probe: &'a dyn DurationProbe,
    ) -> Self {
        Self {
            resolver,
            acquirer,
            probe,
        }
    }

    /// Resolves and acquires every request in order, recording each track in
    /// the directory manifest. Individual failures skip the request; directory
    /// I/O failures abort.
    pub fn acquire_all(
        &self,
        requests: &[TrackRequest],
        ctx: &RunContext,
    ) -> anyhow::Result<AcquisitionReport> {
        let dir = ctx.track_dir();
        // the burn stage plans from this directory even when nothing is acquired
        std::fs::create_dir_all(&dir)?;
        // runs are not resumable, each one records its own tracks
        let mut manifest = Manifest::default();
        manifest.save(&dir)?;
        let mut report = AcquisitionReport::default();

        for request in requests {
            info!(
                "[{}/{}] {} - {}",
                request.order_index, ctx.total_count, request.artist, request.song
            );

            let candidate = match self.resolver.resolve(&request.song, &request.artist) {
                Resolution::Found(candidate) => candidate,
                Resolution::NotFound { reason } => {
                    warn!("skipping \"{}\": {reason}", request.song);
                    report.skipped.push((request.clone(), reason));
                    continue;
                }
            };

            let path = match self.acquirer.acquire(
                &candidate,
                &dir,
                request.order_index,
                ctx.total_count,
            ) {
                Ok(path) => path,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    warn!("skipping \"{}\": {e}", request.song);
                    report.skipped.push((request.clone(), e.to_string()));
                    continue;
                }
            };

            let duration = match self.probe.duration(&path) {
                Ok(duration) => duration,
                Err(e) => {
                    warn!("removing {}: unreadable duration: {e:#}", path.display());
                    std::fs::remove_file(&path)?;
                    report.skipped.push((request.clone(), format!("{e:#}")));
                    continue;
                }
            };

            manifest.record(ManifestEntry {
                order_index: request.order_index,
                file_name: file_name(&path),
                duration_ms: duration.as_millis() as u64,
                source: Some(EntrySource {
                    artist: request.artist.clone(),
                    song: request.song.clone(),
                    identifier: candidate.identifier.clone(),
                }),
            });
            manifest.save(&dir)?;

            report.acquired.push(AcquiredTrack {
                path,
                duration,
                order_index: request.order_index,
            });
        }

        Ok(report)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, time::Duration};

    use tempfile::TempDir;

    use super::*;
    use crate::{
        burn::planner::CapacityPlanner,
        http::client::testing::ScriptedFetcher,
        media::{
            probe::testing::FixedProbe,
            testing::{FakeMedia, FakeTranscoder, candidate},
        },
        resolve::{candidate::ResolverSettings, extract::VideoIdMarker},
        retry::{RetryPolicy, testing::RecordingSleeper},
    };

    fn request(i: usize, artist: &str, song: &str) -> TrackRequest {
        TrackRequest {
            artist: artist.into(),
            song: song.into(),
            order_index: i,
            album: None,
        }
    }

    fn settings() -> ResolverSettings {
        ResolverSettings {
            results_url: "https://search.test/?q=".into(),
            min_identifier_len: 5,
            search_retry: RetryPolicy::new(1, Duration::ZERO),
            verify_retry: RetryPolicy::new(0, Duration::ZERO),
        }
    }

    fn hit(id: &str) -> anyhow::Result<String> {
        Ok(format!(r#""videoId":"{id}""#))
    }

    #[test]
    fn folder_defaults_to_sanitized_artist() {
        let requests = vec![request(1, "AC/DC", "Thunderstruck")];
        let ctx = RunContext::for_run(
            Path::new("/burns"),
            None,
            &InputSource::List("list.txt".into()),
            &requests,
        );
        assert_eq!(ctx.track_dir(), PathBuf::from("/burns/ACDC"));
        assert_eq!(ctx.total_count, 1);

        let album = InputSource::Album {
            album: "Mezzanine".into(),
            artist: "Massive Attack".into(),
        };
        let ctx = RunContext::for_run(Path::new("/burns"), Some("Mix"), &album, &[]);
        assert_eq!(ctx.track_dir(), PathBuf::from("/burns/Mix/Mezzanine"));

        let list = InputSource::List("l".into());
        let ctx = RunContext::for_run(Path::new("/burns"), None, &list, &[]);
        assert_eq!(ctx.folder, FALLBACK_FOLDER);
    }

    #[test]
    fn acquires_found_tracks_and_skips_the_rest() {
        let tmp = TempDir::new().unwrap();
        let requests = vec![
            request(1, "Moby", "Porcelain"),
            request(2, "Moby", "Nobody Knows"),
            request(3, "Moby", "Natural Blues"),
        ];
        let ctx = RunContext::for_run(
            tmp.path(),
            None,
            &InputSource::List("list.txt".into()),
            &requests,
        );

        let fetcher = ScriptedFetcher::new(vec![
            hit("porcelain01"),
            Ok("no results".into()),
            Ok("still nothing".into()),
            hit("natural0001"),
        ]);
        let media = FakeMedia::with(vec![
            candidate("porcelain01", "Moby - Porcelain", ""),
            candidate("natural0001", "Moby - Natural Blues", ""),
        ]);
        let sleeper = RecordingSleeper::default();
        let transcoder = FakeTranscoder::default();
        let probe = FixedProbe::minutes(&[
            ("1. Moby - Porcelain.mp3", 4),
            ("3. Moby - Natural Blues.mp3", 4),
        ]);

        let pipeline = Pipeline::new(
            CandidateResolver::new(&fetcher, &VideoIdMarker, &media, &sleeper, settings()),
            TrackAcquirer::new(&media, &transcoder),
            &probe,
        );
        let report = pipeline.acquire_all(&requests, &ctx).unwrap();

        assert_eq!(report.acquired.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0.order_index, 2);

        let dir = ctx.track_dir();
        let manifest = Manifest::load(&dir).unwrap().unwrap();
        let names: Vec<_> = manifest.tracks.iter().map(|t| t.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["1. Moby - Porcelain.mp3", "3. Moby - Natural Blues.mp3"]
        );
        assert_eq!(
            manifest.tracks[1].source.as_ref().map(|s| s.identifier.as_str()),
            Some("natural0001")
        );

        // the manifest and a rebuilt listing plan identically
        let from_manifest = CapacityPlanner::new(&probe).plan(&dir, 80.0).unwrap();
        std::fs::remove_file(crate::storage::manifest::manifest_path(&dir)).unwrap();
        let from_listing = CapacityPlanner::new(&probe).plan(&dir, 80.0).unwrap();
        assert_eq!(from_manifest, from_listing);
        assert_eq!(from_listing.files.len(), 2);
    }

    #[test]
    fn run_with_nothing_found_still_plans_an_empty_disc() {
        let tmp = TempDir::new().unwrap();
        let requests = vec![request(1, "Moby", "Porcelain")];
        let ctx = RunContext::for_run(
            tmp.path(),
            None,
            &InputSource::List("list.txt".into()),
            &requests,
        );

        let fetcher = ScriptedFetcher::new(vec![Ok("no results".into()), Ok("none".into())]);
        let media = FakeMedia::default();
        let sleeper = RecordingSleeper::default();
        let transcoder = FakeTranscoder::default();
        let probe = FixedProbe::default();

        let pipeline = Pipeline::new(
            CandidateResolver::new(&fetcher, &VideoIdMarker, &media, &sleeper, settings()),
            TrackAcquirer::new(&media, &transcoder),
            &probe,
        );
        let report = pipeline.acquire_all(&requests, &ctx).unwrap();
        assert_eq!(report.skipped.len(), 1);

        let set = CapacityPlanner::new(&probe).plan(&ctx.track_dir(), 80.0).unwrap();
        assert!(set.files.is_empty());
    }

    #[test]
    fn empty_request_list_still_plans_an_empty_disc() {
        let tmp = TempDir::new().unwrap();
        let album = InputSource::Album {
            album: "Unknown".into(),
            artist: "Nobody".into(),
        };
        let ctx = RunContext::for_run(tmp.path(), None, &album, &[]);

        let fetcher = ScriptedFetcher::default();
        let media = FakeMedia::default();
        let sleeper = RecordingSleeper::default();
        let transcoder = FakeTranscoder::default();
        let probe = FixedProbe::default();

        let pipeline = Pipeline::new(
            CandidateResolver::new(&fetcher, &VideoIdMarker, &media, &sleeper, settings()),
            TrackAcquirer::new(&media, &transcoder),
            &probe,
        );
        pipeline.acquire_all(&[], &ctx).unwrap();

        let set = CapacityPlanner::new(&probe).plan(&ctx.track_dir(), 80.0).unwrap();
        assert!(set.files.is_empty());
    }

    #[test]
    fn rerun_starts_a_fresh_manifest() {
        let tmp = TempDir::new().unwrap();
        let requests = vec![request(1, "Moby", "Porcelain")];
        let ctx = RunContext::for_run(
            tmp.path(),
            None,
            &InputSource::List("list.txt".into()),
            &requests,
        );
        let dir = ctx.track_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let mut stale = Manifest::default();
        stale.record(ManifestEntry {
            order_index: 7,
            file_name: "7. Gone.mp3".into(),
            duration_ms: 60_000,
            source: None,
        });
        stale.save(&dir).unwrap();

        let fetcher = ScriptedFetcher::new(vec![hit("porcelain01")]);
        let media = FakeMedia::with(vec![candidate("porcelain01", "Moby - Porcelain", "")]);
        let sleeper = RecordingSleeper::default();
        let transcoder = FakeTranscoder::default();
        let probe = FixedProbe::minutes(&[("1. Moby - Porcelain.mp3", 4)]);

        let pipeline = Pipeline::new(
            CandidateResolver::new(&fetcher, &VideoIdMarker, &media, &sleeper, settings()),
            TrackAcquirer::new(&media, &transcoder),
            &probe,
        );
        pipeline.acquire_all(&requests, &ctx).unwrap();

        let manifest = Manifest::load(&dir).unwrap().unwrap();
        let names: Vec<_> = manifest.tracks.iter().map(|t| t.file_name.as_str()).collect();
        assert_eq!(names, vec!["1. Moby - Porcelain.mp3"]);
    }

    #[test]
    fn unreadable_duration_removes_the_file() {
        let tmp = TempDir::new().unwrap();
        let requests = vec![request(1, "Moby", "Porcelain")];
        let ctx = RunContext::for_run(
            tmp.path(),
            None,
            &InputSource::List("list.txt".into()),
            &requests,
        );

        let fetcher = ScriptedFetcher::new(vec![hit("porcelain01")]);
        let media = FakeMedia::with(vec![candidate("porcelain01", "Moby - Porcelain", "")]);
        let sleeper = RecordingSleeper::default();
        let transcoder = FakeTranscoder::default();
        let probe = FixedProbe::default();

        let pipeline = Pipeline::new(
            CandidateResolver::new(&fetcher, &VideoIdMarker, &media, &sleeper, settings()),
            TrackAcquirer::new(&media, &transcoder),
            &probe,
        );
        let report = pipeline.acquire_all(&requests, &ctx).unwrap();

        assert!(report.acquired.is_empty());
        assert!(!ctx.track_dir().join("1. Moby - Porcelain.mp3").exists());
    }
}

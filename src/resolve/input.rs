use std::path::PathBuf;

use anyhow::Context;
use log::debug;

use crate::{
    domain::track::TrackRequest,
    resolve::tracklist::{TrackListScraper, TrackPair},
};

/// Where the requests of a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// tab-separated `artist<TAB>song` lines
    List(PathBuf),
    /// discover the track list of an album
    Album { album: String, artist: String },
}

impl InputSource {
    /// One positional argument is a list file, two are `album artist`.
    pub fn from_args(source: String, artist: Option<String>) -> Self {
        match artist {
            Some(artist) => InputSource::Album {
                album: source,
                artist,
            },
            None => InputSource::List(PathBuf::from(source)),
        }
    }
}

pub struct InputResolver<'a> {
    scraper: &'a TrackListScraper<'a>,
}

impl<'a> InputResolver<'a> {
    pub fn new(scraper: &'a TrackListScraper<'a>) -> Self {
        Self { scraper }
    }

    /// Ordered requests, numbered from 1.
    pub fn resolve(&self, source: &InputSource) -> anyhow::Result<Vec<TrackRequest>> {
        match source {
            InputSource::List(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read track list {}", path.display()))?;
                Ok(number(parse_list(&contents), None))
            }
            InputSource::Album { album, artist } => {
                let pairs = self.scraper.resolve(album, artist);
                Ok(number(pairs, Some(album)))
            }
        }
    }
}

/// Lines that do not split into exactly two fields are skipped.
pub fn parse_list(contents: &str) -> Vec<TrackPair> {
    contents
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('\t').collect();
            match parts.as_slice() {
                [artist, song] if !artist.trim().is_empty() && !song.trim().is_empty() => {
                    Some((artist.trim().to_string(), song.trim().to_string()))
                }
                _ => {
                    if !line.trim().is_empty() {
                        debug!("skipping malformed list line {line:?}");
                    }
                    None
                }
            }
        })
        .collect()
}

fn number(pairs: Vec<TrackPair>, album: Option<&String>) -> Vec<TrackRequest> {
    pairs
        .into_iter()
        .enumerate()
        .map(|(i, (artist, song))| TrackRequest {
            artist,
            song,
            order_index: i + 1,
            album: album.cloned(),
        })
        .collect()
}

//! Discovers the songs of an album from an encyclopedia page

use std::collections::HashSet;

use log::{debug, info, warn};

use crate::{
    config::ReferenceConfig,
    http::{PageFetcher, client::query_url},
    resolve::extract::TrackTableParser,
};

/// (artist, song)
pub type TrackPair = (String, String);

pub struct TrackListScraper<'a> {
    fetcher: &'a dyn PageFetcher,
    parser: &'a dyn TrackTableParser,
    reference: ReferenceConfig,
}

impl<'a> TrackListScraper<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        parser: &'a dyn TrackTableParser,
        reference: ReferenceConfig,
    ) -> Self {
        Self {
            fetcher,
            parser,
            reference,
        }
    }

    /// Deduplicated (artist, song) pairs in page order.
    ///
    /// A page without a recognizable track table gives an empty list;
    /// so does a failed search, which is logged.
    pub fn resolve(&self, album: &str, artist: &str) -> Vec<TrackPair> {
        let search_url = query_url(&self.reference.search_url, &format!("{album} {artist}"));
        let search_page = match self.fetcher.fetch(&search_url) {
            Ok(page) => page,
            Err(e) => {
                warn!("track list search for {album} by {artist} failed: {e:#}");
                return Vec::new();
            }
        };

        let Some(link) = self.parser.first_result_link(&search_page) else {
            warn!("no reference page found for {album} by {artist}");
            return Vec::new();
        };
        let page_url = self.page_url(&link);
        debug!("reading track list from {page_url}");

        let album_page = match self.fetcher.fetch(&page_url) {
            Ok(page) => page,
            Err(e) => {
                warn!("failed to fetch {page_url}: {e:#}");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        let pairs: Vec<TrackPair> = self
            .parser
            .track_titles(&album_page)
            .into_iter()
            .filter(|song| seen.insert(song.clone()))
            .map(|song| (artist.to_string(), song))
            .collect();

        info!("found {} tracks for {album} by {artist}", pairs.len());
        pairs
    }

    fn page_url(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else {
            format!(
                "{}/{}",
                self.reference.base_url.trim_end_matches('/'),
                link.trim_start_matches('/')
            )
        }
    }
}

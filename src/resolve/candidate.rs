//! Finds a remote media item for a song and checks it belongs to the artist

use log::{debug, info};

use crate::{
    config::{Config, RetryConfig},
    domain::track::Candidate,
    http::{PageFetcher, client::query_url},
    media::MediaSource,
    resolve::extract::IdentifierExtractor,
    retry::{RetryPolicy, Sleeper},
};

/// Outcome of a resolution. Failures carry only a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(Candidate),
    NotFound { reason: String },
}

#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub results_url: String,
    pub min_identifier_len: usize,
    pub search_retry: RetryPolicy,
    pub verify_retry: RetryPolicy,
}

impl ResolverSettings {
    pub fn from_config(config: &Config) -> Self {
        let RetryConfig { search, verify } = config.retry.clone();
        Self {
            results_url: config.search.results_url.clone(),
            min_identifier_len: config.search.min_identifier_len,
            search_retry: search.into(),
            verify_retry: verify.into(),
        }
    }
}

pub struct CandidateResolver<'a> {
    fetcher: &'a dyn PageFetcher,
    extractor: &'a dyn IdentifierExtractor,
    media: &'a dyn MediaSource,
    sleeper: &'a dyn Sleeper,
    settings: ResolverSettings,
}

impl<'a> CandidateResolver<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        extractor: &'a dyn IdentifierExtractor,
        media: &'a dyn MediaSource,
        sleeper: &'a dyn Sleeper,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            media,
            sleeper,
            settings,
        }
    }

    /// Searches "artist song", falling back to "song artist", then verifies
    /// the hit. A mismatch repeats the swapped search and verification until
    /// the verify policy runs out.
    pub fn resolve(&self, song: &str, artist: &str) -> Resolution {
        let direct = format!("{artist} {song}");
        let swapped = format!("{song} {artist}");

        let first = self.settings.search_retry.run(self.sleeper, |attempt| {
            let query = if attempt == 0 { &direct } else { &swapped };
            self.search(query)
        });
        let Some(first) = first else {
            return Resolution::NotFound {
                reason: format!("no video found for \"{song}\" by {artist}"),
            };
        };

        let mut pending = Some(first);
        let verified = self.settings.verify_retry.run(self.sleeper, |attempt| {
            let identifier = match pending.take() {
                Some(id) => id,
                None => {
                    debug!("re-verifying \"{song}\" by {artist}, attempt {attempt}");
                    self.search(&swapped)?
                }
            };
            self.verify(&identifier, artist)
        });

        match verified {
            Some(candidate) => {
                info!("matched \"{song}\" to {} ({})", candidate.identifier, candidate.title);
                Resolution::Found(candidate)
            }
            None => Resolution::NotFound {
                reason: format!(
                    "no video mentioning {artist} after {} verification attempts",
                    self.settings.verify_retry.attempts()
                ),
            },
        }
    }

    /// One search round trip. Fetch failures count as "no identifier".
    fn search(&self, query: &str) -> Option<String> {
        let url = query_url(&self.settings.results_url, query);
        let body = match self.fetcher.fetch(&url) {
            Ok(body) => body,
            Err(e) => {
                debug!("search for \"{query}\" failed: {e:#}");
                return None;
            }
        };

        let id = self.extractor.first_identifier(&body)?;
        if id.len() < self.settings.min_identifier_len {
            debug!("ignoring identifier {id:?} for \"{query}\": too short");
            return None;
        }
        Some(id)
    }

    fn verify(&self, identifier: &str, artist: &str) -> Option<Candidate> {
        match self.media.describe(identifier) {
            Ok(candidate) if candidate.mentions_artist(artist) => Some(candidate),
            Ok(candidate) => {
                debug!(
                    "{identifier} ({}) does not mention {artist}, rejecting",
                    candidate.title
                );
                None
            }
            Err(e) => {
                debug!("could not fetch metadata for {identifier}: {e:#}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::anyhow;

    use super::*;
    use crate::{
        http::client::testing::ScriptedFetcher,
        media::testing::{FakeMedia, candidate},
        resolve::extract::VideoIdMarker,
        retry::testing::RecordingSleeper,
    };

    fn settings() -> ResolverSettings {
        ResolverSettings {
            results_url: "https://search.test/?q=".into(),
            min_identifier_len: 5,
            search_retry: RetryPolicy::new(1, Duration::from_millis(100)),
            verify_retry: RetryPolicy::new(3, Duration::from_millis(200)),
        }
    }

    fn hit(id: &str) -> anyhow::Result<String> {
        Ok(format!(r#"{{"contents":[{{"videoId":"{id}","title":"x"}}]}}"#))
    }

    #[test]
    fn accepts_candidate_naming_the_artist() {
        let fetcher = ScriptedFetcher::new(vec![hit("aaaaaaaaaaa")]);
        let media = FakeMedia::with(vec![candidate(
            "aaaaaaaaaaa",
            "RADIOHEAD - Karma Police",
            "",
        )]);
        let sleeper = RecordingSleeper::default();
        let resolver =
            CandidateResolver::new(&fetcher, &VideoIdMarker, &media, &sleeper, settings());

        let result = resolver.resolve("Karma Police", "Radiohead");

        assert_eq!(
            result,
            Resolution::Found(candidate("aaaaaaaaaaa", "RADIOHEAD - Karma Police", ""))
        );
        assert_eq!(
            *fetcher.requests.borrow(),
            vec!["https://search.test/?q=Radiohead%20Karma%20Police"]
        );
        assert!(sleeper.waits.borrow().is_empty());
    }

    #[test]
    fn artist_in_description_is_enough() {
        let fetcher = ScriptedFetcher::new(vec![hit("bbbbbbbbbbb")]);
        let media = FakeMedia::with(vec![candidate(
            "bbbbbbbbbbb",
            "Karma Police (Official Video)",
            "Provided to YouTube by radiohead ltd",
        )]);
        let sleeper = RecordingSleeper::default();
        let resolver =
            CandidateResolver::new(&fetcher, &VideoIdMarker, &media, &sleeper, settings());

        assert!(matches!(
            resolver.resolve("Karma Police", "Radiohead"),
            Resolution::Found(_)
        ));
    }

    #[test]
    fn short_identifier_triggers_swapped_search() {
        let fetcher = ScriptedFetcher::new(vec![hit("abc"), hit("ccccccccccc")]);
        let media = FakeMedia::with(vec![candidate("ccccccccccc", "Blur - Song 2", "")]);
        let sleeper = RecordingSleeper::default();
        let resolver =
            CandidateResolver::new(&fetcher, &VideoIdMarker, &media, &sleeper, settings());

        let result = resolver.resolve("Song 2", "Blur");

        assert!(matches!(result, Resolution::Found(c) if c.identifier == "ccccccccccc"));
        assert_eq!(
            *fetcher.requests.borrow(),
            vec![
                "https://search.test/?q=Blur%20Song%202",
                "https://search.test/?q=Song%202%20Blur",
            ]
        );
        assert_eq!(*sleeper.waits.borrow(), vec![Duration::from_millis(100)]);
    }

    #[test]
    fn no_identifier_after_swapped_search_is_not_found() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok("<html>no results</html>".into()),
            Err(anyhow!("connection refused")),
        ]);
        let media = FakeMedia::default();
        let sleeper = RecordingSleeper::default();
        let resolver =
            CandidateResolver::new(&fetcher, &VideoIdMarker, &media, &sleeper, settings());

        let result = resolver.resolve("Song 2", "Blur");

        assert!(matches!(result, Resolution::NotFound { .. }));
        assert_eq!(fetcher.requests.borrow().len(), 2);
        assert!(media.described.borrow().is_empty());
    }

    #[test]
    fn mismatch_is_abandoned_after_three_reverifications() {
        let fetcher = ScriptedFetcher::new(vec![
            hit("ddddddddddd"),
            hit("eeeeeeeeeee"),
            hit("fffffffffff"),
            hit("ggggggggggg"),
            hit("hhhhhhhhhhh"),
        ]);
        let media = FakeMedia::with(vec![
            candidate("ddddddddddd", "Cover of Wonderwall", "karaoke"),
            candidate("eeeeeeeeeee", "Wonderwall lyrics", "fan upload"),
            candidate("fffffffffff", "Wonderwall piano", "tutorial"),
            candidate("ggggggggggg", "Wonderwall 1 hour", "loop"),
            candidate("hhhhhhhhhhh", "Oasis - Wonderwall", ""),
        ]);
        let sleeper = RecordingSleeper::default();
        let resolver =
            CandidateResolver::new(&fetcher, &VideoIdMarker, &media, &sleeper, settings());

        let result = resolver.resolve("Wonderwall", "Oasis");

        assert!(matches!(result, Resolution::NotFound { .. }));
        // the initial check plus three re-verifications, never a fifth
        assert_eq!(
            *media.described.borrow(),
            vec!["ddddddddddd", "eeeeeeeeeee", "fffffffffff", "ggggggggggg"]
        );
        assert_eq!(fetcher.requests.borrow().len(), 4);
        for url in &fetcher.requests.borrow()[1..] {
            assert_eq!(url, "https://search.test/?q=Wonderwall%20Oasis");
        }
        assert_eq!(sleeper.waits.borrow().len(), 3);
    }

    #[test]
    fn mismatch_then_match_is_found() {
        let fetcher = ScriptedFetcher::new(vec![hit("iiiiiiiiiii"), hit("jjjjjjjjjjj")]);
        let media = FakeMedia::with(vec![
            candidate("iiiiiiiiiii", "Creep (cover)", ""),
            candidate("jjjjjjjjjjj", "Creep", "Radiohead official"),
        ]);
        let sleeper = RecordingSleeper::default();
        let resolver =
            CandidateResolver::new(&fetcher, &VideoIdMarker, &media, &sleeper, settings());

        let result = resolver.resolve("Creep", "Radiohead");

        assert!(matches!(result, Resolution::Found(c) if c.identifier == "jjjjjjjjjjj"));
        assert_eq!(*sleeper.waits.borrow(), vec![Duration::from_millis(200)]);
    }

    #[test]
    fn metadata_failure_counts_as_failed_verification() {
        let fetcher = ScriptedFetcher::new(vec![hit("unknown0000"), hit("kkkkkkkkkkk")]);
        let media = FakeMedia::with(vec![candidate("kkkkkkkkkkk", "Muse - Hysteria", "")]);
        let sleeper = RecordingSleeper::default();
        let resolver =
            CandidateResolver::new(&fetcher, &VideoIdMarker, &media, &sleeper, settings());

        assert!(matches!(
            resolver.resolve("Hysteria", "Muse"),
            Resolution::Found(c) if c.identifier == "kkkkkkkkkkk"
        ));
    }

    #[test]
    fn empty_artist_never_verifies() {
        let c = candidate("lllllllllll", "Anything", "");
        assert!(!c.mentions_artist("  "));
        assert!(c.mentions_artist("any"));
    }
}

//! Text extraction from search results and reference pages.
//!
//! Callers only see the traits, so a structured parser can replace the
//! marker/regex strategies without touching the resolvers.

use std::sync::LazyLock;

use regex::Regex;

/// Pulls a media identifier out of a search response body.
pub trait IdentifierExtractor {
    fn first_identifier(&self, body: &str) -> Option<String>;
}

/// Finds the first `"videoId":"<id>"` marker.
pub struct VideoIdMarker;

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""videoId":"([^"]*)""#).expect("static regex"));

impl IdentifierExtractor for VideoIdMarker {
    fn first_identifier(&self, body: &str) -> Option<String> {
        VIDEO_ID
            .captures(body)
            .map(|c| c[1].to_string())
            .filter(|id| !id.is_empty())
    }
}

/// Parses encyclopedia-style search and album pages.
pub trait TrackTableParser {
    /// Link of the first search result, as written in the page.
    fn first_result_link(&self, search_page: &str) -> Option<String>;

    /// Song titles of the track table, in page order.
    fn track_titles(&self, album_page: &str) -> Vec<String>;
}

/// Marker-based parser for MediaWiki pages: the first
/// `mw-search-result-heading` anchor, and `id="trackN"` rows each followed
/// by a cell holding the title.
pub struct MediaWikiMarkers;

static RESULT_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)mw-search-result-heading.*?<a\s[^>]*?href="([^"]+)""#)
        .expect("static regex")
});

static TRACK_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)id="track\d+".*?<td[^>]*>(.*?)</td>"#).expect("static regex")
});

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|\n").expect("static regex"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static regex"));

impl TrackTableParser for MediaWikiMarkers {
    fn first_result_link(&self, search_page: &str) -> Option<String> {
        RESULT_HEADING
            .captures(search_page)
            .map(|c| decode_entities(&c[1]))
    }

    fn track_titles(&self, album_page: &str) -> Vec<String> {
        let mut titles = Vec::new();
        let mut pos = 0;

        // each match consumes its row, so the next search starts after it
        while let Some(caps) = TRACK_ROW.captures_at(album_page, pos) {
            let whole = caps.get(0).map(|m| m.end()).unwrap_or(album_page.len());
            pos = whole.max(pos + 1);

            titles.extend(cell_titles(&caps[1]));

            if pos >= album_page.len() {
                break;
            }
        }

        titles
    }
}

/// Splits a title cell on embedded line breaks and strips markup and quotes.
fn cell_titles(cell: &str) -> Vec<String> {
    LINE_BREAK
        .split(cell)
        .map(|part| {
            let text = TAG.replace_all(part, "");
            let text = decode_entities(&text);
            text.replace(['"', '\u{201c}', '\u{201d}'], "")
                .trim()
                .to_string()
        })
        .filter(|t| !t.is_empty())
        .collect()
}

fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

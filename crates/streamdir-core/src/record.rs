//! Upstream record normalization.
//!
//! A `RawRecord` is the loose shape a source fetcher yields per listing
//! entry; `normalize` turns it into a `Candidate` or rejects it. Rejection
//! is silent (counted by the caller), never an error.

use serde::Deserialize;
use url::Url;

/// One entry as delivered by an upstream listing. Field names vary across
/// upstreams; `address`/`type` aliases cover the common variants.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "address")]
    pub url: Option<String>,
    /// Declared stream container ("hls", "flv", "mp4", ...), if the
    /// upstream provides one.
    #[serde(default, alias = "type")]
    pub kind: Option<String>,
}

/// A normalized stream entry, ready for filtering and dedup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub url: String,
    pub group: String,
}

/// Path or declared-type markers that identify a recognized stream container.
const CONTAINER_MARKERS: &[&str] = &[".m3u8", ".flv", ".mp4"];
const CONTAINER_KINDS: &[&str] = &["hls", "m3u8", "flv", "mp4"];

/// Normalize one upstream record into a candidate for the given group.
///
/// Rejects records with a missing/empty URL, an unparseable URL, a scheme
/// outside the allow-list (http, https, rtmp), or — for http(s) — a URL
/// whose path and declared type both fail to indicate a recognized stream
/// container. A missing display name falls back to the URL itself.
pub fn normalize(record: &RawRecord, group: &str) -> Option<Candidate> {
    let url_str = record.url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
    let parsed = Url::parse(url_str).ok()?;

    match parsed.scheme() {
        "rtmp" => {}
        "http" | "https" => {
            let path = parsed.path().to_ascii_lowercase();
            let path_ok = CONTAINER_MARKERS.iter().any(|m| path.contains(m));
            let kind_ok = record
                .kind
                .as_deref()
                .map(|k| CONTAINER_KINDS.iter().any(|c| k.eq_ignore_ascii_case(c)))
                .unwrap_or(false);
            if !path_ok && !kind_ok {
                return None;
            }
        }
        _ => return None,
    }

    let name = record
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(url_str)
        .to_string();

    Some(Candidate {
        name,
        url: url_str.to_string(),
        group: group.to_string(),
    })
}

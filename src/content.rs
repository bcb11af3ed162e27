//! Content classification for upstream responses.
//!
//! The classification decides two things: the `Cache-Control` policy of the
//! outbound response and whether the body goes through the playlist rewriter.
//! A response can carry both playlist and segment signals; rewriting follows
//! the playlist signal while caching follows the segment signal.

use url::Url;

/// Content type sent when the upstream does not declare one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const SEGMENT_CACHE: &str = "public, max-age=31536000, immutable";
const PLAYLIST_CACHE: &str = "no-cache, no-store, must-revalidate";
const OTHER_CACHE: &str = "public, max-age=3600";

/// What kind of resource the upstream returned, as far as rewriting goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// HLS playlist, body is rewritten
    Playlist,
    /// Media segment, immutable per URL
    Segment,
    Other,
}

/// Raw playlist and segment signals of an upstream response.
///
/// Both can hold at once (a `.ts` URL served as `mpegurl`). The rewrite
/// decision and the cache policy resolve that overlap in opposite orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_playlist: bool,
    pub is_segment: bool,
}

impl Classification {
    /// Inspect the upstream content type and the requested URL
    pub fn classify(content_type: Option<&str>, target_url: &str) -> Self {
        let content_type = content_type.unwrap_or_default().to_ascii_lowercase();

        Self {
            is_playlist: content_type.contains("mpegurl")
                || content_type.contains("m3u8")
                || url_has_suffix(target_url, ".m3u8"),
            is_segment: url_has_suffix(target_url, ".ts") || content_type.contains("mp2t"),
        }
    }

    /// Tag driving the body path: Playlist, then Segment, then Other
    pub fn kind(self) -> ContentKind {
        if self.is_playlist {
            ContentKind::Playlist
        } else if self.is_segment {
            ContentKind::Segment
        } else {
            ContentKind::Other
        }
    }

    /// `Cache-Control` value: Segment, then Playlist, then Other
    pub fn cache_control(self) -> &'static str {
        if self.is_segment {
            SEGMENT_CACHE
        } else if self.is_playlist {
            PLAYLIST_CACHE
        } else {
            OTHER_CACHE
        }
    }
}

/// Suffix match on the raw URL, falling back to the parsed path so that
/// `playlist.m3u8?token=abc` still counts.
fn url_has_suffix(target_url: &str, suffix: &str) -> bool {
    if target_url.ends_with(suffix) {
        return true;
    }
    Url::parse(target_url)
        .map(|url| url.path().ends_with(suffix))
        .unwrap_or(false)
}

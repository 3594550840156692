use m3u8_rs::{Playlist, parse_playlist_res};
use serde::Serialize;
use tracing::debug;

/// Structural shape of a playlist as seen by a strict HLS parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaylistKind {
    /// Multi-variant playlist listing quality renditions
    Master,
    /// Playlist listing media segments
    Media,
    /// The strict parser rejected the text
    Unparseable,
}

/// Classify playlist content as master or media using m3u8-rs.
///
/// Parse failures degrade to [`PlaylistKind::Unparseable`]; they never
/// abort the surrounding analysis.
pub fn classify_playlist(content: &str) -> PlaylistKind {
    if !content.contains("#EXTM3U") {
        return PlaylistKind::Unparseable;
    }

    match parse_playlist_res(content.as_bytes()) {
        Ok(Playlist::MasterPlaylist(master)) => {
            debug!("Master playlist with {} variants", master.variants.len());
            PlaylistKind::Master
        }
        Ok(Playlist::MediaPlaylist(media)) => {
            debug!("Media playlist with {} segments", media.segments.len());
            PlaylistKind::Media
        }
        Err(e) => {
            debug!("Strict playlist parse failed: {:?}", e);
            PlaylistKind::Unparseable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_media_playlist() {
        let content = "#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXTINF:10.0,\nseg1.ts\n#EXT-X-ENDLIST\n";
        assert_eq!(classify_playlist(content), PlaylistKind::Media);
    }

    #[test]
    fn classifies_master_playlist() {
        let content = "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1280000,RESOLUTION=1920x1080\nhigh.m3u8\n";
        assert_eq!(classify_playlist(content), PlaylistKind::Master);
    }

    #[test]
    fn missing_header_is_unparseable() {
        assert_eq!(classify_playlist("seg1.ts\nseg2.ts\n"), PlaylistKind::Unparseable);
        assert_eq!(classify_playlist(""), PlaylistKind::Unparseable);
    }
}

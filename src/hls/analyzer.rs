//! Best-effort HLS manifest analysis.
//!
//! [`analyze`] extracts structural and quality metadata from manifest text
//! without ever rejecting it: every field degrades independently to its
//! absent form (`None`, `0` or an empty list) when the text does not carry it.
//! Tag presence checks are plain substring tests, not line-anchored.

use super::parser::{PlaylistKind, classify_playlist};
use crate::config::DEFAULT_PREVIEW_LIMIT;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

const HEADER_TAG: &str = "#EXTM3U";
const SEGMENT_DURATION_TAG: &str = "#EXTINF";
const END_TAG: &str = "#EXT-X-ENDLIST";
const VARIANT_TAG: &str = "#EXT-X-STREAM-INF:";
const MEDIA_TAG: &str = "#EXT-X-MEDIA:";
const EVENT_MARKER: &str = "#EXT-X-PLAYLIST-TYPE:EVENT";
const ROLLING_MARKER: &str = "#EXT-X-MEDIA-SEQUENCE";

static TARGET_DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#EXT-X-TARGETDURATION:(\d+)").expect("valid regex"));
static MEDIA_SEQUENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#EXT-X-MEDIA-SEQUENCE:(\d+)").expect("valid regex"));
static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#EXT-X-VERSION:(\d+)").expect("valid regex"));
static SEGMENT_DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#EXTINF:(\d+\.?\d*|\.\d+)").expect("valid regex"));

// Attribute patterns are applied to the attribute list after the tag name.
static BANDWIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|,)BANDWIDTH=(\d+)").expect("valid regex"));
static RESOLUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|,)RESOLUTION=(\d+x\d+)").expect("valid regex"));
static CODECS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:^|,)CODECS="([^"]+)""#).expect("valid regex"));
static MEDIA_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|,)TYPE=([A-Z-]+)").expect("valid regex"));
static MEDIA_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:^|,)NAME="([^"]*)""#).expect("valid regex"));

/// Metadata extracted from one manifest text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestReport {
    /// Non-blank lines that are not `#` tags or comments
    pub segment_count: usize,
    /// Non-blank lines
    pub line_count: usize,
    /// Size of the analyzed text in bytes
    pub content_length: usize,
    pub has_header_tag: bool,
    pub has_segment_duration_tags: bool,
    pub has_end_tag: bool,
    pub target_duration_seconds: Option<u64>,
    pub media_sequence: Option<u64>,
    /// Declared `#EXTINF` durations in file order
    pub segment_durations: Vec<f64>,
    pub total_duration_seconds: f64,
    /// Mean of `segment_durations`, zero when there are none
    pub average_duration_seconds: f64,
    /// One entry per variant declaration carrying a bandwidth, in file order
    pub bandwidth_samples_bps: Vec<u64>,
    pub max_bandwidth: Option<u64>,
    pub min_bandwidth: Option<u64>,
    pub resolutions: Vec<String>,
    pub codec_strings: Vec<String>,
    pub format_version: Option<u64>,
    /// An end-of-list marker is present
    pub is_vod: bool,
    /// An event marker is present, or a rolling marker without an end marker.
    /// Not exclusive with `is_vod`.
    pub is_live: bool,
    pub audio_track_names: Vec<String>,
    pub subtitle_track_names: Vec<String>,
    pub playlist_kind: PlaylistKind,
    /// Leading part of the raw text, `...`-suffixed when truncated
    pub preview: String,
}

impl ManifestReport {
    /// Bandwidth of the first (default) variant in kbps, rounded.
    pub fn bandwidth_kbps(&self) -> Option<u64> {
        self.bandwidth_samples_bps
            .first()
            .map(|bps| (*bps as f64 / 1000.0).round() as u64)
    }

    /// Resolution of the first (default) variant.
    pub fn default_resolution(&self) -> Option<&str> {
        self.resolutions.first().map(String::as_str)
    }

    /// Codec string of the first (default) variant.
    pub fn default_codecs(&self) -> Option<&str> {
        self.codec_strings.first().map(String::as_str)
    }

    /// Total duration rounded to whole seconds.
    pub fn rounded_total_seconds(&self) -> u64 {
        self.total_duration_seconds.round() as u64
    }

    /// Average segment duration rounded to one decimal.
    pub fn rounded_average_seconds(&self) -> f64 {
        (self.average_duration_seconds * 10.0).round() / 10.0
    }
}

/// Analyze manifest text with the default preview size.
pub fn analyze(text: &str) -> ManifestReport {
    analyze_with_preview(text, DEFAULT_PREVIEW_LIMIT)
}

/// Analyze manifest text, echoing at most `preview_limit` characters.
pub fn analyze_with_preview(text: &str, preview_limit: usize) -> ManifestReport {
    let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    let segment_count = lines.iter().filter(|line| !line.starts_with('#')).count();

    let has_header_tag = text.contains(HEADER_TAG);
    let has_segment_duration_tags = text.contains(SEGMENT_DURATION_TAG);
    let has_end_tag = text.contains(END_TAG);

    let segment_durations: Vec<f64> = SEGMENT_DURATION
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect();
    let total_duration_seconds: f64 = segment_durations.iter().sum();
    let average_duration_seconds = if segment_durations.is_empty() {
        0.0
    } else {
        total_duration_seconds / segment_durations.len() as f64
    };

    let variants = scan_variants(&lines);
    let tracks = scan_media_tracks(&lines);

    let is_vod = has_end_tag;
    let is_live = text.contains(EVENT_MARKER) || (text.contains(ROLLING_MARKER) && !has_end_tag);

    let report = ManifestReport {
        segment_count,
        line_count: lines.len(),
        content_length: text.len(),
        has_header_tag,
        has_segment_duration_tags,
        has_end_tag,
        target_duration_seconds: first_integer(&TARGET_DURATION, text),
        media_sequence: first_integer(&MEDIA_SEQUENCE, text),
        total_duration_seconds,
        average_duration_seconds,
        segment_durations,
        max_bandwidth: variants.bandwidths.iter().copied().max(),
        min_bandwidth: variants.bandwidths.iter().copied().min(),
        bandwidth_samples_bps: variants.bandwidths,
        resolutions: variants.resolutions,
        codec_strings: variants.codecs,
        format_version: first_integer(&VERSION, text),
        is_vod,
        is_live,
        audio_track_names: tracks.audio,
        subtitle_track_names: tracks.subtitles,
        playlist_kind: classify_playlist(text),
        preview: preview(text, preview_limit),
    };

    debug!(
        "Analyzed manifest: {} segments, {} variants, vod={}, live={}",
        report.segment_count,
        report.bandwidth_samples_bps.len(),
        report.is_vod,
        report.is_live
    );

    report
}

#[derive(Default)]
struct VariantAttributes {
    bandwidths: Vec<u64>,
    resolutions: Vec<String>,
    codecs: Vec<String>,
}

/// Collect per-variant attributes from every `#EXT-X-STREAM-INF` line.
fn scan_variants(lines: &[&str]) -> VariantAttributes {
    let mut variants = VariantAttributes::default();

    for attributes in lines.iter().filter_map(|line| attribute_list(line, VARIANT_TAG)) {
        if let Some(bandwidth) = BANDWIDTH
            .captures(attributes)
            .and_then(|caps| caps[1].parse().ok())
        {
            variants.bandwidths.push(bandwidth);
        }
        if let Some(caps) = RESOLUTION.captures(attributes) {
            variants.resolutions.push(caps[1].to_string());
        }
        if let Some(caps) = CODECS.captures(attributes) {
            variants.codecs.push(caps[1].to_string());
        }
    }

    variants
}

#[derive(Default)]
struct MediaTracks {
    audio: Vec<String>,
    subtitles: Vec<String>,
}

/// Collect rendition names from `#EXT-X-MEDIA` lines by type.
fn scan_media_tracks(lines: &[&str]) -> MediaTracks {
    let mut tracks = MediaTracks::default();

    for attributes in lines.iter().filter_map(|line| attribute_list(line, MEDIA_TAG)) {
        let Some(name) = MEDIA_NAME.captures(attributes).map(|caps| caps[1].to_string()) else {
            continue;
        };
        match MEDIA_TYPE.captures(attributes).as_ref().map(|caps| &caps[1]) {
            Some("AUDIO") => tracks.audio.push(name),
            Some("SUBTITLES") => tracks.subtitles.push(name),
            _ => {}
        }
    }

    tracks
}

/// The attribute list following `tag` on this line, if the tag occurs.
fn attribute_list<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    line.find(tag).map(|idx| line[idx + tag.len()..].trim_end())
}

fn first_integer(pattern: &Regex, text: &str) -> Option<u64> {
    pattern
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

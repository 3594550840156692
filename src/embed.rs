//! Embed-code generation and the embeddable player surface.
//!
//! The embeddable route takes the manifest URL as a single percent-encoded
//! path segment. Encoding escapes everything except the unreserved marks
//! `- _ . ! ~ * ' ( )`, so reserved characters (`/ ? & : %`) survive one
//! encode/decode round trip unchanged.

use crate::error::{MediaLensError, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::Serialize;
use std::fmt::Write;

/// Path prefix of the embeddable player route.
pub const EMBED_PATH: &str = "/s";

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 450;

const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Generated iframe embed code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedCode {
    /// Address of the embeddable surface
    pub src: String,
    /// Ready-to-paste `<iframe>` snippet
    pub html: String,
}

/// Percent-encode a manifest URL as one path segment.
pub fn encode_target(url: &str) -> String {
    utf8_percent_encode(url, COMPONENT).to_string()
}

/// Decode the path segment of the embeddable route.
///
/// Rejects truncated or non-hex escapes and escapes that do not form UTF-8.
pub fn decode_target(raw: &str) -> Result<String> {
    let bytes = raw.as_bytes();
    for (idx, _) in raw.match_indices('%') {
        let escape = bytes.get(idx + 1..idx + 3);
        if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
            return Err(MediaLensError::InvalidEmbedTarget(format!(
                "malformed escape at offset {}",
                idx
            )));
        }
    }

    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| MediaLensError::InvalidEmbedTarget("escapes do not form UTF-8".into()))?;

    if decoded.trim().is_empty() {
        return Err(MediaLensError::InvalidEmbedTarget("empty manifest URL".into()));
    }

    Ok(decoded.into_owned())
}

/// Build the iframe snippet embedding `manifest_url` from `base_url`.
pub fn embed_code(base_url: &str, manifest_url: &str, width: u32, height: u32) -> Result<EmbedCode> {
    let target = manifest_url.trim();
    if target.is_empty() {
        return Err(MediaLensError::InvalidEmbedTarget("empty manifest URL".into()));
    }

    let src = format!(
        "{}{}/{}",
        base_url.trim_end_matches('/'),
        EMBED_PATH,
        encode_target(target)
    );
    let html = format!(
        r#"<iframe src="{}" width="{}" height="{}" frameborder="0" allowfullscreen></iframe>"#,
        escape_html(&src),
        width,
        height
    );

    Ok(EmbedCode { src, html })
}

/// Minimal autoplaying video surface for an embedded manifest.
pub fn render_player_surface(manifest_url: &str) -> String {
    let mut page = String::with_capacity(1024);
    let _ = writeln!(page, "<!DOCTYPE html>");
    let _ = writeln!(page, r#"<html><head><meta charset="utf-8"><title>medialens player</title>"#);
    let _ = writeln!(
        page,
        "<style>html,body{{margin:0;height:100%;background:#000}}video{{width:100%;height:100%;object-fit:contain}}</style>"
    );
    let _ = writeln!(page, "</head><body>");
    let _ = writeln!(page, r#"<video controls autoplay crossorigin="anonymous">"#);
    let _ = writeln!(
        page,
        r#"<source src="{}" type="application/x-mpegURL">"#,
        escape_html(manifest_url)
    );
    let _ = writeln!(page, "Your browser does not support video playback.");
    let _ = writeln!(page, "</video>");
    let _ = writeln!(page, "</body></html>");
    page
}

/// Error surface shown instead of the player when the target is unusable.
pub fn render_error_surface(message: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n",
            r#"<html><head><meta charset="utf-8"><title>medialens player</title></head>"#,
            "<body style=\"margin:0;background:#000;color:#fff;font-family:sans-serif\">",
            "<div role=\"alert\" style=\"padding:2em\"><h3>Failed to load</h3><p>{}</p></div>",
            "</body></html>\n"
        ),
        escape_html(message)
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

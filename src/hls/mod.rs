pub mod analyzer;
pub mod parser;

pub use analyzer::{ManifestReport, analyze, analyze_with_preview};
pub use parser::{PlaylistKind, classify_playlist};

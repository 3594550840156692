use super::session::{ErrorDescriptor, ErrorKind, Progress, SessionId};
use crate::hls::ManifestReport;

/// Failure reported by the media element itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFault {
    Aborted,
    Network,
    Decode,
    SourceNotSupported,
}

impl MediaFault {
    pub fn descriptor(self) -> ErrorDescriptor {
        match self {
            MediaFault::Aborted => {
                ErrorDescriptor::new(ErrorKind::NetworkError, "Media loading was aborted")
            }
            MediaFault::Network => ErrorDescriptor::new(
                ErrorKind::NetworkError,
                "A network error interrupted playback",
            ),
            MediaFault::Decode => {
                ErrorDescriptor::new(ErrorKind::DecodeError, "The stream could not be decoded")
            }
            MediaFault::SourceNotSupported => ErrorDescriptor::new(
                ErrorKind::UnsupportedFormat,
                "The stream format is not supported",
            ),
        }
    }
}

/// Signals delivered by the media element's listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementSignal {
    /// Enough data is loaded to start playback (native path ready)
    CanPlay,
    Playing,
    Paused,
    Progress(Progress),
    /// A play request was refused by autoplay policy
    AutoplayBlocked,
    Error(MediaFault),
}

/// Broad category of an adaptive-streaming engine error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorCategory {
    Network,
    Media,
    Timeout,
    Other,
}

/// Error reported by the adaptive-streaming engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineFault {
    pub category: EngineErrorCategory,
    /// Fatal faults end the session; others are recoverable hiccups
    pub fatal: bool,
    pub detail: String,
}

impl EngineFault {
    pub fn fatal(category: EngineErrorCategory, detail: impl Into<String>) -> Self {
        Self {
            category,
            fatal: true,
            detail: detail.into(),
        }
    }

    pub fn recoverable(category: EngineErrorCategory, detail: impl Into<String>) -> Self {
        Self {
            category,
            fatal: false,
            detail: detail.into(),
        }
    }

    pub fn descriptor(&self) -> ErrorDescriptor {
        if !self.fatal {
            return ErrorDescriptor::new(ErrorKind::EngineNonFatal, self.detail.clone());
        }

        let kind = match self.category {
            EngineErrorCategory::Network => ErrorKind::NetworkError,
            EngineErrorCategory::Timeout => ErrorKind::Timeout,
            EngineErrorCategory::Media | EngineErrorCategory::Other => ErrorKind::DecodeError,
        };
        ErrorDescriptor::new(kind, format!("Playback engine error: {}", self.detail))
    }
}

/// Signals delivered by the adaptive-streaming engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineSignal {
    /// Manifest parsed and media attached (engine path ready)
    ManifestParsed,
    Error(EngineFault),
}

/// Outcome of the best-effort manifest analysis run alongside playback.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Report(Box<ManifestReport>),
    Failed(ErrorDescriptor),
}

#[derive(Debug, Clone)]
pub enum PlayerEventKind {
    Element(ElementSignal),
    Engine(EngineSignal),
    /// Guard window elapsed
    LoadTimeout,
    AnalysisFinished(AnalysisOutcome),
}

/// A signal tagged with the session it belongs to.
#[derive(Debug, Clone)]
pub struct PlayerEvent {
    pub session: SessionId,
    pub kind: PlayerEventKind,
}

use crate::hls::ManifestReport;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Identifies one user-initiated playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionId(pub(crate) u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Playback status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackStatus {
    Idle,
    Loading,
    Playing,
    Paused,
    Failed,
}

impl PlaybackStatus {
    /// Loading, playing or paused: the session still holds playback resources.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            PlaybackStatus::Loading | PlaybackStatus::Playing | PlaybackStatus::Paused
        )
    }
}

/// Classification of everything that can go wrong around playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Manifest text could not be fetched
    FetchFailed,
    /// Manifest was fetched but could not be decoded as text
    ManifestUnreadable,
    /// Neither native nor engine-backed playback is available
    UnsupportedFormat,
    NetworkError,
    DecodeError,
    /// No ready signal within the guard window
    Timeout,
    /// Autoplay was refused; the user has to start playback
    AutoplayBlocked,
    /// Recoverable engine diagnostic
    EngineNonFatal,
}

impl ErrorKind {
    /// Whether this kind drives a session to `Failed`.
    ///
    /// Fetch and decode problems of the manifest are fatal for analysis but
    /// only ever surface as a warning next to playback.
    pub fn is_fatal(self) -> bool {
        !matches!(self, ErrorKind::AutoplayBlocked | ErrorKind::EngineNonFatal)
    }
}

/// An error recorded on a session, with a message suitable for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDescriptor {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorDescriptor {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(window: Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!(
                "Stream did not become ready within {}s, check the link and retry",
                window.as_secs()
            ),
        )
    }

    pub fn autoplay_blocked() -> Self {
        Self::new(
            ErrorKind::AutoplayBlocked,
            "Autoplay was blocked by the browser, tap play to start",
        )
    }

    pub fn unsupported_format() -> Self {
        Self::new(
            ErrorKind::UnsupportedFormat,
            "This browser cannot play HLS streams",
        )
    }

    pub fn is_recoverable(&self) -> bool {
        !self.kind.is_fatal()
    }
}

impl fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Position information reported by the media element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Progress {
    pub current_time_seconds: f64,
    pub duration_seconds: f64,
    /// End of the last buffered range
    pub buffered_seconds: f64,
}

/// State of one playback session.
///
/// Superseded entirely by the next `play`; mutated only through the
/// transition methods below, which return whether the transition applied.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackSession {
    pub id: SessionId,
    pub source_url: String,
    pub status: PlaybackStatus,
    pub current_time_seconds: f64,
    pub duration_seconds: f64,
    pub buffered_seconds: f64,
    pub last_error: Option<ErrorDescriptor>,
    /// Result of the side analysis, once it finished successfully
    pub report: Option<ManifestReport>,
    /// Soft warning from a failed side analysis
    pub warning: Option<ErrorDescriptor>,
}

impl PlaybackSession {
    /// A fresh session, already `Loading`.
    pub(crate) fn loading(id: SessionId, source_url: impl Into<String>) -> Self {
        Self {
            id,
            source_url: source_url.into(),
            status: PlaybackStatus::Loading,
            current_time_seconds: 0.0,
            duration_seconds: 0.0,
            buffered_seconds: 0.0,
            last_error: None,
            report: None,
            warning: None,
        }
    }

    pub(crate) fn mark_playing(&mut self) -> bool {
        match self.status {
            PlaybackStatus::Loading | PlaybackStatus::Paused => {
                self.status = PlaybackStatus::Playing;
                // A pending "tap to play" notice is resolved once playback starts.
                if self
                    .last_error
                    .as_ref()
                    .is_some_and(|e| e.kind == ErrorKind::AutoplayBlocked)
                {
                    self.last_error = None;
                }
                true
            }
            _ => false,
        }
    }

    pub(crate) fn mark_paused(&mut self) -> bool {
        if self.status == PlaybackStatus::Playing {
            self.status = PlaybackStatus::Paused;
            true
        } else {
            false
        }
    }

    /// Record a non-fatal notice without changing status.
    pub(crate) fn advise(&mut self, notice: ErrorDescriptor) -> bool {
        if self.status == PlaybackStatus::Loading {
            self.last_error = Some(notice);
            true
        } else {
            false
        }
    }

    pub(crate) fn fail(&mut self, error: ErrorDescriptor) -> bool {
        if self.status.is_active() {
            self.status = PlaybackStatus::Failed;
            self.last_error = Some(error);
            true
        } else {
            false
        }
    }

    pub(crate) fn stop(&mut self) {
        self.status = PlaybackStatus::Idle;
        self.current_time_seconds = 0.0;
    }

    pub(crate) fn update_progress(&mut self, progress: Progress) {
        self.current_time_seconds = progress.current_time_seconds;
        self.duration_seconds = progress.duration_seconds;
        self.buffered_seconds = progress.buffered_seconds;
    }
}

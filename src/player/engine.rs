//! Seams between the playback controller and the platform.
//!
//! The controller never talks to a real video element, streaming library or
//! network stack directly; it drives these traits and receives their
//! callbacks as [`PlayerEvent`]s through an [`EventSink`].

use super::event::{ElementSignal, EngineSignal, PlayerEvent, PlayerEventKind};
use super::session::SessionId;
use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

/// MIME type probed on the element for native HLS support.
pub const HLS_MIME: &str = "application/vnd.apple.mpegurl";

/// The media-rendering element.
pub trait MediaElement: Send {
    /// Whether the element can play `mime` without an engine.
    fn can_play_type(&self, mime: &str) -> bool;
    /// Register listeners; signals go to `sink` until its subscription ends.
    fn attach_listeners(&mut self, sink: EventSink);
    fn set_source(&mut self, url: &str);
    /// Request playback; the outcome arrives as `Playing` or `AutoplayBlocked`.
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
}

/// An adaptive-streaming engine instance bound to one session.
pub trait StreamingEngine: Send {
    fn attach_media(&mut self, element: &mut dyn MediaElement);
    fn load_source(&mut self, url: &str);
    /// Release the engine. Called exactly once, on teardown.
    fn destroy(&mut self);
}

/// Creates engine instances when native playback is unavailable.
pub trait EngineFactory: Send {
    fn is_supported(&self) -> bool;
    fn create(&self, sink: EventSink) -> Box<dyn StreamingEngine>;
}

/// Fetches manifest text for the best-effort analysis.
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> crate::error::Result<String>;
}

/// Delivery handle for one session's element and engine callbacks.
///
/// Once the owning [`Subscription`] is dropped the sink goes quiet: further
/// signals are discarded at the source.
#[derive(Clone, Debug)]
pub struct EventSink {
    session: SessionId,
    tx: UnboundedSender<PlayerEvent>,
    token: CancellationToken,
}

impl EventSink {
    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn element(&self, signal: ElementSignal) {
        self.emit(PlayerEventKind::Element(signal));
    }

    pub fn engine(&self, signal: EngineSignal) {
        self.emit(PlayerEventKind::Engine(signal));
    }

    pub(crate) fn emit(&self, kind: PlayerEventKind) {
        if self.is_closed() {
            debug!("Dropping {:?} for closed {}", kind, self.session);
            return;
        }
        // The receiver lives as long as the controller's event stream.
        let _ = self.tx.send(PlayerEvent {
            session: self.session,
            kind,
        });
    }
}

/// Listener registration for one session.
///
/// Dropping it detaches the session's listeners and cancels every timer
/// derived from [`Subscription::child_token`].
#[derive(Debug)]
pub struct Subscription {
    sink: EventSink,
    _guard: DropGuard,
}

impl Subscription {
    pub(crate) fn open(session: SessionId, tx: UnboundedSender<PlayerEvent>) -> Self {
        let token = CancellationToken::new();
        Self {
            _guard: token.clone().drop_guard(),
            sink: EventSink { session, tx, token },
        }
    }

    pub fn sink(&self) -> EventSink {
        self.sink.clone()
    }

    /// A token cancelled no later than this subscription ends.
    pub fn child_token(&self) -> CancellationToken {
        self.sink.token.child_token()
    }
}

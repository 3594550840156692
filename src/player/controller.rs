//! Playback session state machine.
//!
//! One [`PlaybackController`] owns the media element and at most one
//! streaming engine. Every `play` tears the previous session down before
//! building the next, so two engines never coexist. Callbacks are delivered
//! through [`PlayerEvents`] and applied one at a time with
//! [`PlaybackController::handle`]; events tagged with a superseded session
//! are discarded.

use super::engine::{EngineFactory, HLS_MIME, ManifestFetcher, MediaElement, StreamingEngine, Subscription};
use super::event::{
    AnalysisOutcome, ElementSignal, EngineSignal, PlayerEvent, PlayerEventKind,
};
use super::session::{ErrorDescriptor, ErrorKind, PlaybackSession, PlaybackStatus, SessionId};
use crate::error::MediaLensError;
use crate::hls;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Controller settings.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Guard window for the ready signal after entering `Loading`
    pub load_timeout: Duration,
    /// Characters of manifest text kept in analysis previews
    pub preview_limit: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(crate::config::DEFAULT_LOAD_TIMEOUT_SECS),
            preview_limit: crate::config::DEFAULT_PREVIEW_LIMIT,
        }
    }
}

impl From<&crate::config::Config> for PlayerConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            load_timeout: config.load_timeout(),
            preview_limit: config.preview_limit,
        }
    }
}

/// Receiving end of the controller's event stream.
#[derive(Debug)]
pub struct PlayerEvents {
    rx: UnboundedReceiver<PlayerEvent>,
}

impl PlayerEvents {
    pub async fn next(&mut self) -> Option<PlayerEvent> {
        self.rx.recv().await
    }

    pub fn try_next(&mut self) -> Option<PlayerEvent> {
        self.rx.try_recv().ok()
    }
}

/// Resources held while a session is active. Dropping them is the only
/// release path: the engine is destroyed, listeners detach, timers stop.
struct SessionResources {
    subscription: Subscription,
    engine: Option<Box<dyn StreamingEngine>>,
    guard_timer: Option<CancellationToken>,
}

impl SessionResources {
    fn cancel_guard_timer(&mut self) {
        if let Some(timer) = self.guard_timer.take() {
            timer.cancel();
        }
    }
}

impl Drop for SessionResources {
    fn drop(&mut self) {
        self.cancel_guard_timer();
        if let Some(mut engine) = self.engine.take() {
            debug!("Destroying engine for {}", self.subscription.sink().session());
            engine.destroy();
        }
    }
}

/// Drives one media element through playback sessions, one session at a time.
pub struct PlaybackController<M: MediaElement, F: EngineFactory> {
    element: M,
    factory: F,
    fetcher: Arc<dyn ManifestFetcher>,
    config: PlayerConfig,
    tx: UnboundedSender<PlayerEvent>,
    next_id: u64,
    session: Option<PlaybackSession>,
    resources: Option<SessionResources>,
}

impl<M: MediaElement, F: EngineFactory> PlaybackController<M, F> {
    pub fn new(
        element: M,
        factory: F,
        fetcher: Arc<dyn ManifestFetcher>,
        config: PlayerConfig,
    ) -> (Self, PlayerEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            element,
            factory,
            fetcher,
            config,
            tx,
            next_id: 0,
            session: None,
            resources: None,
        };
        (controller, PlayerEvents { rx })
    }

    /// Start a new session for `url`, superseding any current one.
    ///
    /// Must be called within a Tokio runtime: the side analysis and the
    /// guard timer run as tasks.
    pub fn play(&mut self, url: &str) -> SessionId {
        self.teardown();

        self.next_id += 1;
        let id = SessionId(self.next_id);
        info!("{}: loading {}", id, url);
        self.session = Some(PlaybackSession::loading(id, url));

        let subscription = Subscription::open(id, self.tx.clone());
        self.element.attach_listeners(subscription.sink());
        self.spawn_analysis(id, url);

        let engine = if self.element.can_play_type(HLS_MIME) {
            debug!("{}: using native HLS playback", id);
            self.element.set_source(url);
            None
        } else if self.factory.is_supported() {
            debug!("{}: using streaming engine", id);
            let mut engine = self.factory.create(subscription.sink());
            engine.attach_media(&mut self.element);
            engine.load_source(url);
            Some(engine)
        } else {
            drop(subscription);
            self.fail(ErrorDescriptor::unsupported_format());
            return id;
        };

        let guard_timer = subscription.child_token();
        self.spawn_guard_timer(&subscription, guard_timer.clone());
        self.resources = Some(SessionResources {
            subscription,
            engine,
            guard_timer: Some(guard_timer),
        });

        id
    }

    /// Restart a failed session with the same source.
    ///
    /// Returns `None` unless the current session is `Failed`.
    pub fn retry(&mut self) -> Option<SessionId> {
        let url = self
            .session
            .as_ref()
            .filter(|s| s.status == PlaybackStatus::Failed)?
            .source_url
            .clone();
        info!("Retrying {}", url);
        Some(self.play(&url))
    }

    /// Stop playback and release the session's resources.
    pub fn stop(&mut self) {
        self.element.pause();
        self.element.seek(0.0);
        self.teardown();
        if let Some(session) = self.session.as_mut() {
            info!("{}: stopped", session.id);
            session.stop();
        }
    }

    /// Apply one event. Stale events are ignored.
    pub fn handle(&mut self, event: PlayerEvent) {
        let Some(session) = self.session.as_mut() else {
            debug!("Ignoring {:?} without a session", event.kind);
            return;
        };
        if event.session != session.id {
            debug!(
                "Ignoring event for superseded {} (current {})",
                event.session, session.id
            );
            return;
        }

        match event.kind {
            PlayerEventKind::AnalysisFinished(AnalysisOutcome::Report(report)) => {
                session.report = Some(*report);
            }
            PlayerEventKind::AnalysisFinished(AnalysisOutcome::Failed(warning)) => {
                warn!("{}: manifest analysis failed: {}", session.id, warning);
                session.warning = Some(warning);
            }
            PlayerEventKind::LoadTimeout => {
                if session.status == PlaybackStatus::Loading {
                    self.fail(ErrorDescriptor::timeout(self.config.load_timeout));
                }
            }
            PlayerEventKind::Element(ElementSignal::CanPlay)
            | PlayerEventKind::Engine(EngineSignal::ManifestParsed) => self.on_ready(),
            PlayerEventKind::Element(ElementSignal::Playing) => {
                if session.mark_playing() {
                    info!("{}: playing", session.id);
                    self.cancel_guard_timer();
                }
            }
            PlayerEventKind::Element(ElementSignal::Paused) => {
                session.mark_paused();
            }
            PlayerEventKind::Element(ElementSignal::Progress(progress)) => {
                session.update_progress(progress);
            }
            PlayerEventKind::Element(ElementSignal::AutoplayBlocked) => {
                if session.advise(ErrorDescriptor::autoplay_blocked()) {
                    info!("{}: autoplay blocked, waiting for user", session.id);
                }
            }
            PlayerEventKind::Element(ElementSignal::Error(fault)) => {
                self.fail(fault.descriptor());
            }
            PlayerEventKind::Engine(EngineSignal::Error(fault)) => {
                if fault.fatal {
                    self.fail(fault.descriptor());
                } else {
                    warn!("{}: recoverable engine error: {}", session.id, fault.detail);
                }
            }
        }
    }

    /// Apply every event that is already queued. Returns how many were applied.
    pub fn drain(&mut self, events: &mut PlayerEvents) -> usize {
        let mut applied = 0;
        while let Some(event) = events.try_next() {
            self.handle(event);
            applied += 1;
        }
        applied
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.session
            .as_ref()
            .map_or(PlaybackStatus::Idle, |s| s.status)
    }

    /// Whether an engine instance is currently alive.
    pub fn has_engine(&self) -> bool {
        self.resources
            .as_ref()
            .is_some_and(|r| r.engine.is_some())
    }

    pub fn element(&self) -> &M {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut M {
        &mut self.element
    }

    fn on_ready(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.status != PlaybackStatus::Loading {
            return;
        }
        debug!("{}: ready, attempting autoplay", session.id);
        self.cancel_guard_timer();
        self.element.play();
    }

    fn fail(&mut self, error: ErrorDescriptor) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        warn!("{}: playback failed: {}", session.id, error);
        if session.fail(error) {
            self.teardown();
        }
    }

    fn teardown(&mut self) {
        if let Some(resources) = self.resources.take() {
            debug!("Tearing down {}", resources.subscription.sink().session());
        }
    }

    fn cancel_guard_timer(&mut self) {
        if let Some(resources) = self.resources.as_mut() {
            resources.cancel_guard_timer();
        }
    }

    fn spawn_guard_timer(&self, subscription: &Subscription, timer: CancellationToken) {
        let sink = subscription.sink();
        let window = self.config.load_timeout;
        tokio::spawn(async move {
            tokio::select! {
                _ = timer.cancelled() => {}
                _ = tokio::time::sleep(window) => {
                    debug!("{}: guard window of {:?} elapsed", sink.session(), window);
                    sink.emit(PlayerEventKind::LoadTimeout);
                }
            }
        });
    }

    /// Fetch and analyze the manifest as a side activity. The result is
    /// tagged with `id` so a superseding session discards it.
    fn spawn_analysis(&self, id: SessionId, url: &str) {
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        let url = url.to_string();
        let preview_limit = self.config.preview_limit;

        tokio::spawn(async move {
            let outcome = match fetcher.fetch_text(&url).await {
                Ok(text) => AnalysisOutcome::Report(Box::new(hls::analyze_with_preview(
                    &text,
                    preview_limit,
                ))),
                Err(MediaLensError::ManifestUnreadable(detail)) => AnalysisOutcome::Failed(
                    ErrorDescriptor::new(ErrorKind::ManifestUnreadable, detail),
                ),
                Err(e) => AnalysisOutcome::Failed(ErrorDescriptor::new(
                    ErrorKind::FetchFailed,
                    format!("Could not fetch manifest for analysis: {}", e),
                )),
            };
            let _ = tx.send(PlayerEvent {
                session: id,
                kind: PlayerEventKind::AnalysisFinished(outcome),
            });
        });
    }
}

impl<M: MediaElement, F: EngineFactory> Drop for PlaybackController<M, F> {
    fn drop(&mut self) {
        self.teardown();
    }
}

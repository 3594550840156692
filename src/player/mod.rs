pub mod controller;
pub mod engine;
pub mod event;
pub mod session;

pub use controller::{PlaybackController, PlayerConfig, PlayerEvents};
pub use engine::{
    EngineFactory, EventSink, HLS_MIME, ManifestFetcher, MediaElement, StreamingEngine,
    Subscription,
};
pub use event::{
    AnalysisOutcome, ElementSignal, EngineErrorCategory, EngineFault, EngineSignal, MediaFault,
    PlayerEvent, PlayerEventKind,
};
pub use session::{
    ErrorDescriptor, ErrorKind, PlaybackSession, PlaybackStatus, Progress, SessionId,
};

//! End-to-end tests for medialens
//!
//! Starts a real Axum server on a random port plus a wiremock origin serving
//! manifests, and drives the full HTTP pipeline with reqwest.
//!
//! SSRF note: the origin listens on 127.0.0.1, which the analyze endpoint
//! blocks by default. These servers opt in with `allow_private_origins`.

use medialens::config::Config;
use medialens::embed::encode_target;
use medialens::http_retry::{HttpManifestFetcher, RetryConfig};
use medialens::player::{
    ElementSignal, EngineFactory, EventSink, MediaElement, PlaybackController, PlaybackStatus,
    PlayerConfig, StreamingEngine,
};
use medialens::server::build_router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MASTER_MANIFEST: &str = r#"#EXTM3U
#EXT-X-VERSION:6
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID="aud",NAME="English",LANGUAGE="en",DEFAULT=YES,URI="audio/en.m3u8"
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID="aud",NAME="Svenska",LANGUAGE="sv",URI="audio/sv.m3u8"
#EXT-X-STREAM-INF:BANDWIDTH=2500000,RESOLUTION=1280x720,CODECS="avc1.4d401f,mp4a.40.2",AUDIO="aud"
720p.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360,CODECS="avc1.42e01e,mp4a.40.2",AUDIO="aud"
360p.m3u8
"#;

const LIVE_MANIFEST: &str = "#EXTM3U
#EXT-X-VERSION:3
#EXT-X-TARGETDURATION:6
#EXT-X-MEDIA-SEQUENCE:1042
#EXTINF:6.0,
seg1042.ts
#EXTINF:6.0,
seg1043.ts
";

// ── Test server helpers ───────────────────────────────────────────────────────

/// Mock origin serving a master and a live media playlist.
async fn start_origin() -> MockServer {
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/master.m3u8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MASTER_MANIFEST))
        .mount(&origin)
        .await;
    Mock::given(method("GET"))
        .and(path("/live.m3u8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LIVE_MANIFEST))
        .mount(&origin)
        .await;
    origin
}

/// Spin up a test server on a random port.
///
/// Binds the listener first so `base_url` matches the real address.
async fn start_test_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().unwrap();

    let config = Config {
        port: 0,
        base_url: format!("http://{}", addr),
        is_dev: true,
        load_timeout_secs: 15,
        preview_limit: 64,
        fetch_max_attempts: 2,
        fetch_timeout_secs: 5,
        allow_private_origins: true,
    };

    let app = build_router(config).await;

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_check() {
    let addr = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn analyze_master_playlist_from_origin() {
    let origin = start_origin().await;
    let addr = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("http://{}/api/analyze", addr))
        .query(&[("url", format!("{}/master.m3u8", origin.uri()))])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let report: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(report["playlist_kind"], "master");
    assert_eq!(report["max_bandwidth"], 2_500_000);
    assert_eq!(report["min_bandwidth"], 800_000);
    assert_eq!(report["resolutions"][0], "1280x720");
    assert_eq!(report["codec_strings"][1], "avc1.42e01e,mp4a.40.2");
    assert_eq!(report["audio_track_names"], serde_json::json!(["English", "Svenska"]));
    assert_eq!(report["format_version"], 6);

    // Preview is bounded by the configured limit
    let preview = report["preview"].as_str().unwrap();
    assert!(preview.ends_with("..."));
    assert_eq!(preview.chars().count(), 64 + 3);
}

#[tokio::test]
async fn analyze_live_playlist_from_origin() {
    let origin = start_origin().await;
    let addr = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("http://{}/api/analyze", addr))
        .query(&[("url", format!("{}/live.m3u8", origin.uri()))])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let report: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(report["is_live"], true);
    assert_eq!(report["is_vod"], false);
    assert_eq!(report["media_sequence"], 1042);
    assert_eq!(report["segment_count"], 2);
}

#[tokio::test]
async fn embed_code_round_trips_through_player_route() {
    let addr = start_test_server().await;
    let client = reqwest::Client::new();
    let manifest = "https://cdn.example.com/path/live.m3u8?token=abc&exp=1700000000";

    let code: serde_json::Value = client
        .get(format!("http://{}/api/embed", addr))
        .query(&[("url", manifest)])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let src = code["src"].as_str().unwrap();
    assert_eq!(src, format!("http://{}/s/{}", addr, encode_target(manifest)));

    let resp = client.get(src).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("x-frame-options").unwrap(), "ALLOWALL");

    let page = resp.text().await.unwrap();
    assert!(page.contains("https://cdn.example.com/path/live.m3u8?token=abc&amp;exp=1700000000"));
}

// ── Playback controller against a real origin ─────────────────────────────────

/// Element with native HLS support that reports ready as soon as a source is set.
#[derive(Default)]
struct NativeElement {
    sink: Option<EventSink>,
}

impl MediaElement for NativeElement {
    fn can_play_type(&self, _mime: &str) -> bool {
        true
    }
    fn attach_listeners(&mut self, sink: EventSink) {
        self.sink = Some(sink);
    }
    fn set_source(&mut self, _url: &str) {
        if let Some(sink) = &self.sink {
            sink.element(ElementSignal::CanPlay);
        }
    }
    fn play(&mut self) {
        if let Some(sink) = &self.sink {
            sink.element(ElementSignal::Playing);
        }
    }
    fn pause(&mut self) {}
    fn seek(&mut self, _seconds: f64) {}
}

struct NoEngine;

impl EngineFactory for NoEngine {
    fn is_supported(&self) -> bool {
        false
    }
    fn create(&self, _sink: EventSink) -> Box<dyn StreamingEngine> {
        unreachable!("native playback never creates an engine")
    }
}

#[tokio::test]
async fn controller_analyzes_while_playing() {
    let origin = start_origin().await;
    let fetcher = HttpManifestFetcher::new(reqwest::Client::new(), RetryConfig::default());
    let (mut controller, mut events) = PlaybackController::new(
        NativeElement::default(),
        NoEngine,
        Arc::new(fetcher),
        PlayerConfig::default(),
    );

    controller.play(&format!("{}/live.m3u8", origin.uri()));

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while controller.session().is_some_and(|s| s.report.is_none()) {
        let event = tokio::time::timeout_at(deadline, events.next())
            .await
            .expect("analysis did not finish in time")
            .expect("event stream closed");
        controller.handle(event);
    }

    let session = controller.session().unwrap();
    assert_eq!(session.status, PlaybackStatus::Playing);
    let report = session.report.as_ref().unwrap();
    assert!(report.is_live);
    assert_eq!(report.target_duration_seconds, Some(6));
}

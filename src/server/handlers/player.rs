use crate::server::state::AppState;
use axum::{extract::State, response::Html};

/// Public test streams offered as one-click examples.
const EXAMPLE_STREAMS: &[(&str, &str)] = &[
    ("Mux test stream", "https://test-streams.mux.dev/x36xhzz/x36xhzz.m3u8"),
    (
        "Akamai multi-bitrate",
        "https://multiplatform-f.akamaihd.net/i/multi/will/bunny/big_buck_bunny_,640x360_400,640x360_700,640x360_1000,950x540_1500,.f4v.csmil/master.m3u8",
    ),
];

const LOAD_TIMEOUT_PLACEHOLDER: &str = "__LOAD_TIMEOUT_MS__";
const EXAMPLES_PLACEHOLDER: &str = "__EXAMPLES__";

/// Player page shell: URL input, video surface with play/stop/retry,
/// playback readout, analysis panel, CORS status and embed code.
///
/// The page runs the same Idle/Loading/Playing/Paused/Failed cycle as
/// [`crate::player::PlaybackController`] against the browser's native HLS
/// support, with a guard window of `LOAD_TIMEOUT_SECS`.
const PLAYER_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>medialens</title>
<style>
body{font-family:system-ui,sans-serif;margin:2rem;max-width:60rem}
video{width:100%;background:#000}
#status{margin:.5rem 0;color:#555}
#status.error{color:#b00}
#warning{color:#a60}
#info span{margin-right:1.5rem}
pre{background:#f4f4f4;padding:.5rem;overflow:auto}
[hidden]{display:none}
</style>
</head>
<body>
<h1>medialens</h1>
<form id="load">
<input id="url" type="url" size="70" placeholder="https://example.com/stream.m3u8" required>
<button type="submit">Play</button>
<button type="button" id="stop">Stop</button>
<button type="button" id="retry" hidden>Retry</button>
<button type="button" id="reanalyze">Re-analyze</button>
</form>
<p>Examples: __EXAMPLES__</p>
<p id="status">Enter an HLS manifest URL.</p>
<p id="warning"></p>
<video id="video" controls playsinline></video>
<p id="info"><span id="time">0:00 / 0:00</span><span id="buffered">Buffered 0:00</span><span id="cors">CORS: unknown</span></p>
<h2>Manifest</h2>
<pre id="report"></pre>
<h2>Embed</h2>
<pre id="embed"></pre>
<script>
const LOAD_TIMEOUT_MS = __LOAD_TIMEOUT_MS__;
const video = document.getElementById('video');
const urlInput = document.getElementById('url');
const statusLine = document.getElementById('status');
const warningLine = document.getElementById('warning');
const retryButton = document.getElementById('retry');
let session = 0;
let state = 'idle';
let sourceUrl = '';
let guard = null;

function setState(next, message) {
  state = next;
  statusLine.textContent = message;
  statusLine.className = next === 'failed' ? 'error' : '';
  retryButton.hidden = next !== 'failed';
}
function cancelGuard() {
  if (guard !== null) { clearTimeout(guard); guard = null; }
}
function fail(message) {
  if (state === 'idle' || state === 'failed') return;
  cancelGuard();
  video.removeAttribute('src');
  video.load();
  setState('failed', message);
}
function formatTime(seconds) {
  if (!isFinite(seconds)) return 'live';
  const mins = Math.floor(seconds / 60);
  const secs = Math.floor(seconds % 60);
  return mins + ':' + String(secs).padStart(2, '0');
}
function updateInfo() {
  document.getElementById('time').textContent =
    formatTime(video.currentTime) + ' / ' + formatTime(video.duration || 0);
  const end = video.buffered.length ? video.buffered.end(video.buffered.length - 1) : 0;
  document.getElementById('buffered').textContent = 'Buffered ' + formatTime(end);
}
async function readJson(response) {
  const body = await response.json();
  if (!response.ok) throw new Error(body.error || ('HTTP ' + response.status));
  return body;
}
function analyze(url, id) {
  const q = encodeURIComponent(url);
  fetch('/api/analyze?url=' + q).then(readJson).then(report => {
    if (id !== session) return;
    document.getElementById('report').textContent = JSON.stringify(report, null, 2);
    document.getElementById('cors').textContent = 'CORS: ' + report.cors_status;
  }).catch(err => {
    if (id !== session) return;
    document.getElementById('report').textContent = '';
    warningLine.textContent = 'Manifest analysis unavailable: ' + err.message;
  });
  fetch('/api/embed?url=' + q).then(readJson).then(code => {
    if (id === session) document.getElementById('embed').textContent = code.html;
  }).catch(() => {});
}
function play(url) {
  if (!url) return;
  cancelGuard();
  const id = ++session;
  sourceUrl = url;
  warningLine.textContent = '';
  document.getElementById('cors').textContent = 'CORS: checking';
  setState('loading', 'Loading...');
  if (!video.canPlayType('application/vnd.apple.mpegurl')) {
    fail('This browser cannot play HLS streams natively');
    analyze(url, id);
    return;
  }
  guard = setTimeout(() => {
    if (id === session && state === 'loading') {
      fail('Stream did not become ready within ' + (LOAD_TIMEOUT_MS / 1000) + 's, check the link and retry');
    }
  }, LOAD_TIMEOUT_MS);
  video.src = url;
  video.load();
  analyze(url, id);
}
function stop() {
  session++;
  cancelGuard();
  video.pause();
  video.currentTime = 0;
  video.removeAttribute('src');
  video.load();
  setState('idle', 'Stopped.');
  updateInfo();
}
video.addEventListener('canplay', () => {
  if (state !== 'loading') return;
  cancelGuard();
  video.play().catch(() => {
    if (state === 'loading') statusLine.textContent = 'Autoplay was blocked, press play to start';
  });
});
video.addEventListener('playing', () => {
  if (state === 'loading' || state === 'paused') setState('playing', 'Playing');
});
video.addEventListener('pause', () => {
  if (state === 'playing') setState('paused', 'Paused');
});
video.addEventListener('timeupdate', updateInfo);
video.addEventListener('progress', updateInfo);
video.addEventListener('error', () => {
  if (video.getAttribute('src')) fail('Playback failed, check the link and retry');
});
document.getElementById('load').addEventListener('submit', (event) => {
  event.preventDefault();
  play(urlInput.value.trim());
});
document.getElementById('stop').addEventListener('click', stop);
retryButton.addEventListener('click', () => play(sourceUrl));
document.getElementById('reanalyze').addEventListener('click', () => {
  const url = urlInput.value.trim();
  if (url) { warningLine.textContent = ''; analyze(url, session); }
});
document.querySelectorAll('[data-example]').forEach(link => link.addEventListener('click', (event) => {
  event.preventDefault();
  urlInput.value = link.dataset.example;
  play(link.dataset.example);
}));
</script>
</body>
</html>
"#;

fn render_player_page(load_timeout_secs: u64) -> String {
    let examples = EXAMPLE_STREAMS
        .iter()
        .map(|(name, url)| format!(r##"<a href="#" data-example="{url}">{name}</a>"##))
        .collect::<Vec<_>>()
        .join(" | ");

    PLAYER_PAGE
        .replace(LOAD_TIMEOUT_PLACEHOLDER, &(load_timeout_secs * 1000).to_string())
        .replace(EXAMPLES_PLACEHOLDER, &examples)
}

/// Serve the player page
pub async fn serve_player_page(State(state): State<AppState>) -> Html<String> {
    Html(render_player_page(state.config.load_timeout_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offers_stop_and_retry() {
        let page = render_player_page(15);
        assert!(page.contains(r#"id="stop""#));
        assert!(page.contains(r#"id="retry""#));
        assert!(page.contains(r#"id="reanalyze""#));
        assert!(page.contains("retryButton.hidden = next !== 'failed'"));
    }

    #[test]
    fn guard_window_and_examples_are_filled_in() {
        let page = render_player_page(20);
        assert!(page.contains("const LOAD_TIMEOUT_MS = 20000;"));
        assert!(page.contains(r#"data-example="https://test-streams.mux.dev/x36xhzz/x36xhzz.m3u8""#));
        assert!(!page.contains(LOAD_TIMEOUT_PLACEHOLDER));
        assert!(!page.contains(EXAMPLES_PLACEHOLDER));
    }

    #[test]
    fn analysis_errors_become_warnings() {
        let page = render_player_page(15);
        assert!(page.contains("if (!response.ok) throw new Error"));
        assert!(page.contains("Manifest analysis unavailable: "));
    }
}

use crate::{
    embed::{self, DEFAULT_HEIGHT, DEFAULT_WIDTH, EmbedCode},
    error::Result,
    metrics,
    server::state::AppState,
};
use axum::{
    Json,
    extract::{Query, RawPathParams, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
pub struct EmbedQuery {
    #[serde(default)]
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Serve the embeddable player for a percent-encoded manifest URL.
///
/// The segment is decoded here rather than by `Path`, so malformed escapes
/// are rejected instead of being passed through.
pub async fn serve_embedded_player(params: RawPathParams) -> Response {
    let raw = params
        .iter()
        .find(|(name, _)| *name == "target")
        .map(|(_, value)| value)
        .unwrap_or_default();

    match embed::decode_target(raw) {
        Ok(manifest_url) => {
            debug!("Serving embedded player for {}", manifest_url);
            metrics::record_request("embed_player", 200);
            Html(embed::render_player_surface(&manifest_url)).into_response()
        }
        Err(e) => {
            warn!("Rejected embed target '{}': {}", raw, e);
            metrics::record_request("embed_player", 400);
            (
                StatusCode::BAD_REQUEST,
                Html(embed::render_error_surface(&e.to_string())),
            )
                .into_response()
        }
    }
}

/// Generate iframe embed code for a manifest URL
pub async fn generate_embed_code(
    Query(query): Query<EmbedQuery>,
    State(state): State<AppState>,
) -> Result<Json<EmbedCode>> {
    let code = embed::embed_code(
        &state.config.base_url,
        &query.url,
        query.width.unwrap_or(DEFAULT_WIDTH),
        query.height.unwrap_or(DEFAULT_HEIGHT),
    );

    let status = match &code {
        Ok(_) => 200,
        Err(e) => e.status_code().as_u16(),
    };
    metrics::record_request("embed_code", status);

    code.map(Json)
}

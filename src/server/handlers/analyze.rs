use crate::{
    error::{MediaLensError, Result},
    hls::{self, ManifestReport},
    http_retry::{CorsStatus, decode_manifest_text, fetch_manifest},
    metrics,
    server::{state::AppState, url_validation::validate_manifest_url},
};
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
    pub url: Option<String>,
}

/// Report for a fetched manifest, with the origin's CORS answer.
#[derive(Debug, Serialize)]
pub struct RemoteAnalysis {
    #[serde(flatten)]
    pub report: ManifestReport,
    /// `Access-Control-Allow-Origin` sent by the origin
    pub origin_allow_origin: Option<String>,
    /// Whether the player page may load the manifest directly
    pub cors_status: CorsStatus,
}

/// Fetch a remote manifest and return its report
pub async fn analyze_url(
    Query(query): Query<AnalyzeQuery>,
    State(state): State<AppState>,
) -> Result<Json<RemoteAnalysis>> {
    let start = Instant::now();
    let result = fetch_and_analyze(query, &state).await;

    let status = match &result {
        Ok(_) => 200,
        Err(e) => e.status_code().as_u16(),
    };
    metrics::record_request("analyze_url", status);
    metrics::record_duration("analyze_url", start);

    result.map(Json)
}

async fn fetch_and_analyze(query: AnalyzeQuery, state: &AppState) -> Result<RemoteAnalysis> {
    let url = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| MediaLensError::InvalidRequest("missing 'url' query parameter".into()))?;

    let origin = validate_manifest_url(&url, state.config.allow_private_origins)?;
    info!("Analyzing manifest from {}", origin);

    let fetched = match fetch_manifest(&state.http_client, origin.as_str(), &state.retry).await {
        Ok(fetched) => fetched,
        Err(e) => {
            warn!("Manifest fetch from {} failed: {}", origin, e);
            if matches!(e, MediaLensError::OriginFetchError(_)) {
                metrics::record_origin_error();
            }
            return Err(e);
        }
    };

    let report = hls::analyze_with_preview(&fetched.text, state.config.preview_limit);
    metrics::record_analysis();

    let cors_status = CorsStatus::classify(fetched.allow_origin.as_deref(), &state.config.base_url);
    Ok(RemoteAnalysis {
        report,
        origin_allow_origin: fetched.allow_origin,
        cors_status,
    })
}

/// Analyze manifest text posted as the request body
pub async fn analyze_body(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ManifestReport>> {
    let start = Instant::now();
    let result = decode_manifest_text(&body)
        .map(|text| hls::analyze_with_preview(&text, state.config.preview_limit));

    let status = match &result {
        Ok(_) => {
            metrics::record_analysis();
            200
        }
        Err(e) => e.status_code().as_u16(),
    };
    metrics::record_request("analyze_body", status);
    metrics::record_duration("analyze_body", start);

    result.map(Json)
}

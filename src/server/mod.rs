pub mod handlers;
pub mod state;
pub mod url_validation;

use crate::config::Config;
use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    response::Response,
    routing::{get, post},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};
use tracing::{error, info};

/// Response header carrying the service version.
pub const VERSION_HEADER: &str = "x-medialens-version";

/// Build the application router.
///
/// The embeddable route and the player page may be framed by any origin.
pub async fn build_router(config: Config) -> Router {
    let state = AppState::new(config);

    let frameable = Router::new()
        .route("/s/{target}", get(handlers::embed::serve_embedded_player))
        .route("/player", get(handlers::player::serve_player_page))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("ALLOWALL"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("frame-ancestors *"),
        ));

    let api = Router::new()
        .route(
            "/api/analyze",
            get(handlers::analyze::analyze_url).post(handlers::analyze::analyze_body),
        )
        .route("/api/embed", get(handlers::embed::generate_embed_code))
        .route("/api/join", post(handlers::join::join_text))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        );

    Router::new()
        .route("/", get(handlers::health::health_check))
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::health::render_metrics))
        .merge(frameable)
        .merge(api)
        .layer(middleware::map_response(add_version_header))
        .with_state(state)
}

async fn add_version_header(mut response: Response) -> Response {
    response.headers_mut().insert(
        HeaderName::from_static(VERSION_HEADER),
        HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
    );
    response
}

/// Start the Axum HTTP server
pub async fn start(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("0.0.0.0:{}", config.port);
    let app = build_router(config).await;

    let listener = match tokio::net::TcpListener::bind(addr.as_str()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    info!("Server listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

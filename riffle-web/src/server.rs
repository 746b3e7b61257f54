//! Axum server wiring for the streaming API.

use std::time::Instant;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use riffle_core::{Result, RiffleConfig, RuntimeMode, StreamService};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{health, stream_song, stream_video};

/// Shared application state.
///
/// Built once at startup from configuration; read-only afterwards. Each
/// stream service holds its own media source, so concurrent requests share
/// nothing mutable.
#[derive(Clone)]
pub struct AppState {
    /// Audio-class stream service
    pub audio: StreamService,
    /// Video-class stream service
    pub video: StreamService,
    /// Controls error-detail exposure
    pub runtime_mode: RuntimeMode,
    /// Server start time, reported by the health endpoint
    pub server_started_at: Instant,
}

impl AppState {
    /// Builds state from configuration, constructing one media source per
    /// resource class.
    ///
    /// # Errors
    ///
    /// - `RiffleError::Configuration` - a remote source has an invalid base URL
    pub fn from_config(config: &RiffleConfig) -> Result<Self> {
        Ok(Self {
            audio: StreamService::new(
                config.media.audio.build_source()?,
                config.media.audio_content_type,
            ),
            video: StreamService::new(
                config.media.video.build_source()?,
                config.media.video_content_type,
            ),
            runtime_mode: config.runtime_mode,
            server_started_at: Instant::now(),
        })
    }
}

/// Builds the API router for the given configuration.
///
/// # Errors
///
/// - `RiffleError::Configuration` - a remote source has an invalid base URL
pub fn router(config: &RiffleConfig) -> Result<Router> {
    let state = AppState::from_config(config)?;

    Ok(Router::new()
        .route("/api", get(health))
        .route("/api/stream/{song_name}", get(stream_song))
        .route("/api/videos/{video_name}", get(stream_video))
        .layer(cors_layer(&config.server.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Runs the streaming server until shutdown.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the listener cannot bind,
/// or the server loop fails.
pub async fn run_server(config: RiffleConfig) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = router(&config)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        "Riffle server listening on http://{addr} in {} mode",
        config.runtime_mode
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Restricts CORS to configured origins; permissive when none are configured.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

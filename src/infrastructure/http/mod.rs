use axum::{middleware, routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::infrastructure::config::Config;
use crate::infrastructure::db::DbPool;
use crate::{
    controllers::{health, reader_audio::ReaderAudioController, session::SessionController},
    infrastructure::auth::{auth_middleware, request_id_middleware},
};

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    pool: Arc<DbPool>,
    config: Arc<Config>,
    reader_audio_controller: Arc<ReaderAudioController>,
    session_controller: Arc<SessionController>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Reader audio routes (need auth)
    let reader_audio_routes = Router::new()
        .route(
            "/api/reader-audio/generate",
            post(ReaderAudioController::generate),
        )
        .route("/api/reader-audio/status", get(ReaderAudioController::status))
        .with_state(reader_audio_controller)
        .layer(middleware::from_fn_with_state(
            config.clone(),
            auth_middleware,
        ));

    // Session creation is owner-facing (needs auth)
    let session_owner_routes = Router::new()
        .route("/api/sessions", post(SessionController::create))
        .with_state(session_controller.clone())
        .layer(middleware::from_fn_with_state(
            config.clone(),
            auth_middleware,
        ));

    // Reader-facing session routes (public - knowing the share link grants access)
    let session_public_routes = Router::new()
        .route("/api/sessions/:sessionId", get(SessionController::hydrate))
        .route(
            "/api/sessions/:sessionId/commit",
            post(SessionController::commit),
        )
        .route("/api/sessions/:sessionId/done", post(SessionController::done))
        .with_state(session_controller);

    // Build application routes
    let app = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(pool.clone())
        .merge(reader_audio_routes)
        .merge(session_owner_routes)
        .merge(session_public_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http());

    // Start server
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

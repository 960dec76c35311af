use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::app::{run_frame_loop, AppContext};
use crate::catalog::{CatalogError, CelestrakSource, ElementCache};
use crate::config::{Config, ConfigError};
use crate::registry::SatelliteRegistry;
use crate::snapshot::{SharedScene, SnapshotSink};

use super::api::control as control_handlers;
use super::api::satellites as satellite_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog client error: {0}")]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/satellites", get(satellite_handlers::list_satellites))
        .route("/api/satellites/{id}", get(satellite_handlers::get_satellite))
        .route(
            "/api/satellites/{id}/path",
            get(satellite_handlers::get_orbit_path),
        )
        .route("/api/diagnostics", get(satellite_handlers::diagnostics))
        .route("/api/cache", get(satellite_handlers::cache_stats))
        .route("/api/refresh", post(control_handlers::refresh))
        .route("/api/display", post(control_handlers::display))
        .route("/api/viewport", put(control_handlers::resize))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the frame loop and serve the state API until Ctrl-C.
pub async fn run_server(config: Config) -> Result<(), ServeError> {
    let source = CelestrakSource::new(config.catalog.base_url.clone(), config.catalog.request_timeout)?;
    let cache = Arc::new(Mutex::new(ElementCache::with_bucket(
        source,
        config.catalog.cache_bucket,
    )));

    let scene = SharedScene::default();
    let registry = SatelliteRegistry::new(
        SnapshotSink::new(scene.clone()),
        config.registry_settings()?,
    );
    let ctx = AppContext::new(registry, config.camera(), config.viewport());

    let (controls, control_rx) = mpsc::channel(32);
    let frame_loop = tokio::spawn(run_frame_loop(
        ctx,
        cache,
        config.catalog.groups.clone(),
        config.frame_interval(),
        control_rx,
    ));

    let app = router(AppState { scene, controls });

    log::info!("Starting server on {}", config.web.bind);

    let listener = tokio::net::TcpListener::bind(&config.web.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = frame_loop.await {
        log::error!("Frame loop ended abnormally: {}", e);
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}

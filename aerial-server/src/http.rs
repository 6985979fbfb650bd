//! HTTP surface for the aerial view service.

use std::net::SocketAddr;
use std::sync::Arc;

use aerial_core::{
    Config,
    error::AerialViewError,
    model::{AerialViewRequest, AerialViewResponse, HealthReport, ResponseStatus},
    pipeline,
    provider::{self, DescriptionGenerator, ImageryProvider},
};
use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub struct AppState {
    pub config: Config,
    pub imagery: Option<Arc<dyn ImageryProvider>>,
    pub generator: Option<Arc<dyn DescriptionGenerator>>,
}

impl AppState {
    /// Build provider clients up front when the configuration allows it.
    /// A missing credential leaves the slot empty so the process still
    /// starts and `/health` can report what is wrong.
    pub fn from_config(config: Config) -> Self {
        let imagery = match provider::imagery_from_config(&config) {
            Ok(p) => Some(Arc::from(p)),
            Err(e) => {
                warn!("imagery provider unavailable: {e}");
                None
            }
        };

        let generator = match provider::generator_from_config(&config) {
            Ok(p) => Some(Arc::from(p)),
            Err(e) => {
                warn!("description generator unavailable: {e}");
                None
            }
        };

        Self { config, imagery, generator }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/get-aerial-view", post(get_aerial_view))
        .route("/generate-aerial-view", post(generate_aerial_view))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn serve(config: Config, host: &str, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(config));
    let app = router(state);

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!("starting HTTP server on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Wraps the core error so each variant maps to one HTTP status code.
struct AppError(AerialViewError);

impl From<AerialViewError> for AppError {
    fn from(err: AerialViewError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AerialViewError::Validation(_) => StatusCode::BAD_REQUEST,
            AerialViewError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AerialViewError::Imagery(_)
            | AerialViewError::Generation(_)
            | AerialViewError::EmptyGeneration => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "status": ResponseStatus::Error,
            "error": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Aerial view generator",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(state.config.health())
}

/// Raw satellite tile for the requested coordinates; no model call.
async fn get_aerial_view(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AerialViewRequest>,
) -> Result<Response, AppError> {
    let imagery = state.imagery.as_deref().ok_or_else(|| {
        AppError(AerialViewError::Config(
            "imagery provider not configured (set MAPBOX_ACCESS_TOKEN)".to_string(),
        ))
    })?;

    request.validate()?;

    let image = imagery
        .fetch_image(&request)
        .await
        .inspect_err(|e| warn!("aerial view fetch failed: {e}"))?;

    Ok((
        [
            (header::CONTENT_TYPE, image.mime_type),
            (
                header::CONTENT_DISPOSITION,
                "inline; filename=aerial_view.jpg".to_string(),
            ),
        ],
        image.bytes,
    )
        .into_response())
}

async fn generate_aerial_view(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AerialViewRequest>,
) -> Result<Json<AerialViewResponse>, AppError> {
    let imagery = state.imagery.as_deref().ok_or_else(|| {
        AppError(AerialViewError::Config(
            "imagery provider not configured (set MAPBOX_ACCESS_TOKEN)".to_string(),
        ))
    })?;

    let generator = state.generator.as_deref().ok_or_else(|| {
        AppError(AerialViewError::Config(
            "description generator not configured (set GOOGLE_CLOUD_PROJECT and \
             GEMINI_API_KEY or GOOGLE_APPLICATION_CREDENTIALS)"
                .to_string(),
        ))
    })?;

    let response = pipeline::generate_aerial_view(&request, imagery, generator)
        .await
        .inspect_err(|e| warn!("aerial view request failed: {e}"))?;

    info!(
        latitude = request.latitude,
        longitude = request.longitude,
        "aerial view generated"
    );

    Ok(Json(response))
}

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use estimator::CostEstimator;
use interface::{CostEstimate, EstimateError, FeedStatus, OrderBookSnapshot, PublishedState};

#[derive(Clone)]
pub struct AppState {
    pub published: Arc<PublishedState>,
    pub estimator: CostEstimator,
}

impl AppState {
    pub fn new(published: Arc<PublishedState>) -> Self {
        let estimator = CostEstimator::new(published.clone());
        Self {
            published,
            estimator,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Estimate(#[from] EstimateError),

    #[error("invalid JSON body: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Estimate(EstimateError::NoSnapshotAvailable) => StatusCode::NOT_FOUND,
            ApiError::Estimate(EstimateError::InvalidParameter { .. }) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        let message = self.to_string();
        warn!(status = status.as_u16(), error = %message, "request rejected");

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// API routes under `/api`, a health probe, and (when `static_dir` is set)
/// the built front end on every other path with `index.html` as the
/// fallback for client-side routes.
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api_routes = Router::new()
        .route("/orderbook", get(orderbook_handler))
        .route("/simulate", post(simulate_handler))
        .route("/status", get(status_handler));

    let mut app = Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_handler));

    if let Some(dir) = static_dir {
        let assets = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
        app = app.fallback_service(assets);
    }

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until `true` is sent on `shutdown` (or its sender is dropped),
/// then lets in-flight requests finish.
pub async fn serve(
    state: AppState,
    addr: SocketAddr,
    static_dir: Option<&Path>,
    mut shutdown: watch::Receiver<bool>,
) -> eyre::Result<()> {
    let app = router(state, static_dir);

    let listener = TcpListener::bind(addr).await?;
    info!("Simulator API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await?;

    info!("Simulator API stopped");
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn orderbook_handler(
    State(state): State<AppState>,
) -> Result<Json<OrderBookSnapshot>, ApiError> {
    Ok(Json(state.estimator.snapshot()?))
}

async fn status_handler(State(state): State<AppState>) -> Json<FeedStatus> {
    Json(state.published.status())
}

/// An empty body prices the default order. A missing snapshot wins over a
/// bad body, so clients see 404 until the feed has delivered something.
async fn simulate_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CostEstimate>, ApiError> {
    state.published.snapshot()?;

    let request = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?
    };

    let estimate = state.estimator.estimate_request(&request)?;
    info!(
        net_cost = estimate.net_cost,
        latency_ms = estimate.latency_ms,
        "simulation served"
    );
    Ok(Json(estimate))
}

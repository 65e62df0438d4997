//! Gateway server: one shared kernel behind a mutex, one frame per ingest

use crate::error::ApiError;
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use scorpia_core::{Diagnostic, GatewayConfig, Kernel, KernelStatus};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct GatewayState {
    /// Held for the whole of a frame; priors, synapses and state change together.
    pub kernel: Mutex<Kernel>,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(kernel: Kernel) -> Arc<Self> {
        Arc::new(Self {
            kernel: Mutex::new(kernel),
            started_at: Instant::now(),
        })
    }
}

/// Body of `POST /ingest`: named channels or a bare vector.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum IngestRequest {
    Vector {
        signal: Vec<f64>,
    },
    Channels {
        auditory: f64,
        visual: f64,
        proprioceptive: f64,
        social: f64,
    },
}

impl IngestRequest {
    pub fn values(&self) -> Vec<f64> {
        match self {
            IngestRequest::Vector { signal } => signal.clone(),
            IngestRequest::Channels {
                auditory,
                visual,
                proprioceptive,
                social,
            } => vec![*auditory, *visual, *proprioceptive, *social],
        }
    }
}

pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/ingest", post(ingest_handler))
        .route("/diagnostic", get(diagnostic_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .with_state(state)
}

pub async fn start_gateway(config: GatewayConfig, kernel: Kernel) -> anyhow::Result<()> {
    let state = GatewayState::new(kernel);
    let app = router(state);

    let bind_addr: SocketAddr = format!("{}:{}", config.bind.to_addr(), config.port).parse()?;

    info!("Scorpia Gateway v{} starting", env!("CARGO_PKG_VERSION"));
    info!("  Listening on: {}", bind_addr);
    info!("  Ingest:     POST http://{}/ingest", bind_addr);
    info!("  Diagnostic: GET  http://{}/diagnostic", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ONLINE",
        "system": format!("scorpia v{}", env!("CARGO_PKG_VERSION")),
    }))
}

async fn health_handler(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    let kernel = state.kernel.lock().await;
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "frames": kernel.frames(),
        "budget_overruns": kernel.state().budget_overruns,
        "uptime_secs": state.started_at.elapsed().as_secs(),
    }))
}

/// Run exactly one frame and return the post-frame status.
async fn ingest_handler(
    State(state): State<Arc<GatewayState>>,
    Json(body): Json<IngestRequest>,
) -> Result<Json<KernelStatus>, ApiError> {
    let values = body.values();
    let mut kernel = state.kernel.lock().await;
    let status = kernel.ingest(&values)?;
    Ok(Json(status))
}

/// Read-only snapshot of synapses and priors.
async fn diagnostic_handler(State(state): State<Arc<GatewayState>>) -> Json<Diagnostic> {
    let kernel = state.kernel.lock().await;
    Json(kernel.diagnostic())
}

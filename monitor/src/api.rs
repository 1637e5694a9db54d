// Standard library imports
use std::{
    net::SocketAddr,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

// Third party imports
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

// Internal imports
use crate::scheduler::{DashboardSnapshot, RefreshScheduler};
use crate::stats::region_distribution;
use crate::table::{query_nodes, NodePage, NodeQuery};
use pnode_common::{DataMode, NetworkStats, RegionCount};

/// Cấu trúc phản hồi API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
    pub timestamp: u64,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: "Operation successful".to_string(),
            data: Some(data),
            timestamp: unix_now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
            timestamp: unix_now(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(&self) {
            Ok(json) => Json(json).into_response(),
            Err(err) => {
                let error_response = ApiResponse::<()>::error(format!("JSON serialization error: {}", err));
                Json(error_response).into_response()
            }
        }
    }
}

/// State dùng chung cho các handler
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<RefreshScheduler>,
}

/// Payload đổi chế độ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeRequest {
    pub mode: DataMode,
}

async fn health_check() -> ApiResponse<&'static str> {
    ApiResponse::success("ok")
}

async fn get_snapshot(State(state): State<AppState>) -> ApiResponse<DashboardSnapshot> {
    ApiResponse::success(state.scheduler.snapshot().await)
}

async fn get_nodes(State(state): State<AppState>, Query(query): Query<NodeQuery>) -> ApiResponse<NodePage> {
    let snapshot = state.scheduler.snapshot().await;
    ApiResponse::success(query_nodes(&snapshot.nodes, &query))
}

async fn get_stats(State(state): State<AppState>) -> ApiResponse<NetworkStats> {
    ApiResponse::success(state.scheduler.snapshot().await.stats)
}

async fn get_regions(State(state): State<AppState>) -> ApiResponse<Vec<RegionCount>> {
    let snapshot = state.scheduler.snapshot().await;
    ApiResponse::success(region_distribution(&snapshot.nodes))
}

/// Làm mới thủ công
async fn trigger_refresh(State(state): State<AppState>) -> ApiResponse<DashboardSnapshot> {
    state.scheduler.refresh().await;
    ApiResponse::success(state.scheduler.snapshot().await)
}

async fn set_mode(State(state): State<AppState>, Json(payload): Json<ModeRequest>) -> ApiResponse<DashboardSnapshot> {
    state.scheduler.set_mode(payload.mode).await;
    ApiResponse::success(state.scheduler.snapshot().await)
}

/// Tạo router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/snapshot", get(get_snapshot))
        .route("/api/nodes", get(get_nodes))
        .route("/api/stats", get(get_stats))
        .route("/api/regions", get(get_regions))
        .route("/api/refresh", post(trigger_refresh))
        .route("/api/mode", post(set_mode))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Chạy API server cho tới khi `shutdown` hoàn thành
pub async fn serve<F>(addr: SocketAddr, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);
    info!("API server listening on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::client::{ClientError, OptimizerApi};
use crate::config::{Config, RequestOverrides};
use crate::dashboard::bounded;
use crate::history::aggregator::{aggregate_history, summarize_history};
use crate::history::HistorySummary;
use crate::report::{build_view, OptimizationView};
use crate::types::{Food, OptimizeRequest};

#[derive(Clone)]
struct ApiState {
    config: Arc<Config>,
    api: Arc<dyn OptimizerApi>,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        warn!("backend call failed: {err}");
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: err.user_message().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct OptimizeResponse {
    request: OptimizeRequest,
    view: OptimizationView,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    summary: String,
    history: HistorySummary,
}

#[derive(Debug, Serialize)]
struct FoodsResponse {
    foods: Vec<Food>,
}

pub fn router(config: Config, api: Arc<dyn OptimizerApi>) -> Router {
    let state = ApiState {
        timeout: config.backend.request_timeout(),
        config: Arc::new(config),
        api,
    };
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/v1/optimize", post(optimize))
        .route("/v1/history", get(history))
        .route("/v1/foods", get(list_foods).post(create_food))
        .route("/v1/foods/:name", delete(delete_food))
        .route("/v1/config", get(show_config))
        .layer(cors)
        .with_state(state)
}

pub async fn run_server(config: Config, api: Arc<dyn OptimizerApi>, bind: SocketAddr) -> Result<()> {
    let app = router(config, api);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed binding dashboard API to {bind}"))?;
    info!("dashboard API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config.as_ref().clone())
}

async fn optimize(
    State(state): State<ApiState>,
    Json(body): Json<RequestOverrides>,
) -> ApiResult<OptimizeResponse> {
    let request = state
        .config
        .defaults
        .resolve_request(body)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let outcome = bounded(
        "optimize",
        state.timeout,
        state.api.submit_optimization(&request),
    )
    .await?;
    let view = build_view(&outcome, &request.targets, request.budget);
    Ok(ok(OptimizeResponse { request, view }))
}

async fn history(State(state): State<ApiState>) -> ApiResult<HistoryResponse> {
    let entries = bounded("history", state.timeout, state.api.list_history()).await?;
    let history = aggregate_history(&entries);
    Ok(ok(HistoryResponse {
        summary: summarize_history(&history),
        history,
    }))
}

async fn list_foods(State(state): State<ApiState>) -> ApiResult<FoodsResponse> {
    let foods = bounded("foods", state.timeout, state.api.list_foods()).await?;
    Ok(ok(FoodsResponse { foods }))
}

async fn create_food(
    State(state): State<ApiState>,
    Json(food): Json<Food>,
) -> ApiResult<FoodsResponse> {
    food.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    bounded("add food", state.timeout, state.api.create_food(&food)).await?;
    list_foods(State(state)).await
}

async fn delete_food(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> ApiResult<FoodsResponse> {
    bounded("delete food", state.timeout, state.api.delete_food(&name)).await?;
    list_foods(State(state)).await
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

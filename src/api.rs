use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::error::IdeaError;
use crate::model::{FeedbackInput, HistoryFilters, SubmissionInput};
use crate::services::lifecycle::RequestLifecycleManager;

pub struct AppState {
    pub lifecycle: RequestLifecycleManager,
    pub config: AppConfig,
}

pub async fn run_server(state: Arc<AppState>) {
    let addr = format!("{}:{}", state.config.server.bind, state.config.server.port);

    let app = Router::new()
        .route("/requests", post(submit_request))
        .route("/requests/history", get(request_history))
        .route("/requests/{id}", get(request_status))
        .route("/requests/{id}/results", get(request_results))
        .route("/requests/{id}/cancel", post(cancel_request))
        .route("/requests/{id}/feedback", post(submit_feedback))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind API listener");
    info!("API Server listening on {}", addr);
    axum::serve(listener, app).await.expect("API server failed");
}

#[derive(serde::Deserialize)]
struct OwnerParams {
    user_id: String,
}

#[derive(serde::Deserialize)]
struct OwnerBody {
    user_id: String,
}

#[derive(serde::Deserialize)]
struct HistoryParams {
    user_id: String,
    page: Option<usize>,
    limit: Option<usize>,
    status: Option<String>,
    date_from: Option<DateTime<Utc>>,
    date_to: Option<DateTime<Utc>>,
    priority: Option<String>,
    investment_horizon: Option<String>,
    risk_tolerance: Option<String>,
}

async fn submit_request(
    State(state): State<Arc<AppState>>,
    Json(input): Json<SubmissionInput>,
) -> impl IntoResponse {
    match state.lifecycle.submit_request(input) {
        Ok(request) => (StatusCode::ACCEPTED, Json(json!(request))).into_response(),
        Err(e @ IdeaError::Validation { .. }) => {
            (StatusCode::BAD_REQUEST, Json(json!({"error": e.to_string()}))).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

async fn request_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<OwnerParams>,
) -> impl IntoResponse {
    match state.lifecycle.get_request(&id) {
        Some(request) if request.user_id == params.user_id => {
            Json(json!(request)).into_response()
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("Request not found: {}", id)})),
        )
            .into_response(),
    }
}

async fn request_results(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<OwnerParams>,
) -> impl IntoResponse {
    match state.lifecycle.get_request_results(&id, &params.user_id) {
        Some(result) => Json(json!(result)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("Result not found for request: {}", id)})),
        )
            .into_response(),
    }
}

async fn cancel_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<OwnerBody>,
) -> impl IntoResponse {
    let cancelled = state.lifecycle.cancel_request(&id, &body.user_id);
    Json(json!({"requestId": id, "cancelled": cancelled}))
}

async fn request_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> impl IntoResponse {
    // Enum filters arrive as plain strings; parse them through serde so
    // the wire spellings stay in one place.
    let status = params
        .status
        .as_deref()
        .and_then(|s| serde_json::from_value(json!(s)).ok());
    let priority = params
        .priority
        .as_deref()
        .and_then(|p| serde_json::from_value(json!(p)).ok());

    let filters = HistoryFilters {
        status,
        date_from: params.date_from,
        date_to: params.date_to,
        priority,
        investment_horizon: params.investment_horizon,
        risk_tolerance: params.risk_tolerance,
    };

    let page = state
        .lifecycle
        .get_request_history(&params.user_id, params.page, params.limit, filters);
    Json(json!(page))
}

async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<FeedbackInput>,
) -> impl IntoResponse {
    match state.lifecycle.submit_feedback(&id, input) {
        Ok(feedback) => (StatusCode::CREATED, Json(json!(feedback))).into_response(),
        Err(e @ IdeaError::RequestNotFound { .. }) => {
            (StatusCode::NOT_FOUND, Json(json!({"error": e.to_string()}))).into_response()
        }
        Err(e) => (StatusCode::BAD_REQUEST, Json(json!({"error": e.to_string()}))).into_response(),
    }
}

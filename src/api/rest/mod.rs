pub mod donations;
pub mod requests;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::error::AppError;
use crate::models::submission::{Category, ExpiryWindow, RecordStatus, StorageMethod};
use crate::models::warehouse::Warehouse;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(donations::router())
        .merge(requests::router())
        .route("/warehouses", get(list_warehouses))
        .route("/options", get(options))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct WarehouseMatch {
    pub name: String,
    pub distance: String,
    pub duration: String,
}

/// Unwraps a JSON body, reporting malformed payloads as invalid input.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}

pub(crate) fn parse_status(
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<RecordStatus, AppError> {
    let body = json_body(payload)?;
    RecordStatus::parse(&body.status)
}

async fn list_warehouses(State(state): State<Arc<AppState>>) -> Json<Vec<Warehouse>> {
    Json(state.warehouses.to_vec())
}

#[derive(Serialize)]
struct OptionsResponse {
    categories: Vec<&'static str>,
    dates: Vec<&'static str>,
    methods: Vec<&'static str>,
    statuses: Vec<&'static str>,
}

async fn options() -> Json<OptionsResponse> {
    Json(OptionsResponse {
        categories: Category::labels(),
        dates: ExpiryWindow::labels(),
        methods: StorageMethod::labels(),
        statuses: RecordStatus::ALL.iter().map(|s| s.as_str()).collect(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    warehouses: usize,
    donations: usize,
    requests: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        warehouses: state.warehouses.len(),
        donations: state.donations.len().await,
        requests: state.requests.len().await,
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}

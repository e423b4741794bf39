use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{delete, get, patch, post};
use axum::Json;
use axum::Router;
use serde::Serialize;

use crate::api::rest::{
    json_body, parse_status, MessageResponse, UpdateStatusRequest, WarehouseMatch,
};
use crate::engine::pipeline::process_request;
use crate::engine::records::{self, ListedRecord};
use crate::error::AppError;
use crate::models::submission::{RecordKind, RequestDetails, RequestInput, RequestRecord};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/request", post(submit_request))
        .route("/requests", get(list_requests))
        .route("/requests/:id/status", patch(update_status))
        .route("/requests/:id", delete(delete_request))
}

#[derive(Serialize)]
pub struct RequestResponse {
    pub message: &'static str,
    pub record_id: u64,
    pub warehouse: WarehouseMatch,
    pub record: RequestRecord,
}

async fn submit_request(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RequestInput>, JsonRejection>,
) -> Result<Json<RequestResponse>, AppError> {
    let record = process_request(&state, json_body(payload)?).await?;

    Ok(Json(RequestResponse {
        message: "Request submitted successfully",
        record_id: record.id,
        warehouse: WarehouseMatch {
            name: record.matched_warehouse.name.clone(),
            distance: record.route.distance.clone(),
            duration: record.route.duration.clone(),
        },
        record,
    }))
}

async fn list_requests(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<ListedRecord<RequestDetails>>> {
    Json(records::list_requests(&state).await)
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let status = parse_status(payload)?;
    records::set_status(&state, RecordKind::Request, id, status).await?;

    Ok(Json(MessageResponse {
        message: format!("Status for request {id} updated to {}", status.as_str()),
    }))
}

async fn delete_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<MessageResponse>, AppError> {
    records::delete_record(&state, RecordKind::Request, id).await?;

    Ok(Json(MessageResponse {
        message: format!("Request {id} deleted and IDs reassigned."),
    }))
}

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
use crate::engine::pipeline::process_donation;
use crate::engine::records::{self, ListedRecord};
use crate::error::AppError;
use crate::models::submission::{DonationDetails, DonationInput, DonationRecord, RecordKind};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/donate", post(donate))
        .route("/donations", get(list_donations))
        .route("/donations/:id/status", patch(update_status))
        .route("/donations/:id", delete(delete_donation))
}

#[derive(Serialize)]
pub struct DonationResponse {
    pub message: &'static str,
    pub record_id: u64,
    pub category: &'static str,
    pub warehouse: WarehouseMatch,
    pub record: DonationRecord,
}

async fn donate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DonationInput>, JsonRejection>,
) -> Result<Json<DonationResponse>, AppError> {
    let record = process_donation(&state, json_body(payload)?).await?;

    Ok(Json(DonationResponse {
        message: "Donation request submitted successfully",
        record_id: record.id,
        category: record.details.category.as_str(),
        warehouse: WarehouseMatch {
            name: record.matched_warehouse.name.clone(),
            distance: record.route.distance.clone(),
            duration: record.route.duration.clone(),
        },
        record,
    }))
}

async fn list_donations(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<ListedRecord<DonationDetails>>> {
    Json(records::list_donations(&state).await)
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let status = parse_status(payload)?;
    records::set_status(&state, RecordKind::Donation, id, status).await?;

    Ok(Json(MessageResponse {
        message: format!("Status for donation {id} updated to {}", status.as_str()),
    }))
}

async fn delete_donation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<MessageResponse>, AppError> {
    records::delete_record(&state, RecordKind::Donation, id).await?;

    Ok(Json(MessageResponse {
        message: format!("Donation {id} deleted and IDs reassigned."),
    }))
}

use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::engine::annotator::annotate_route;
use crate::engine::resolver::resolve_location;
use crate::engine::selector::select_nearest;
use crate::error::AppError;
use crate::models::submission::{
    DonationInput, DonationRecord, LocationInput, MatchedWarehouse, NewSubmission, RecordKind,
    RequestInput, RequestRecord, SubmissionRecord,
};
use crate::state::AppState;
use crate::store::RecordStore;

pub async fn process_donation(
    state: &AppState,
    input: DonationInput,
) -> Result<DonationRecord, AppError> {
    let start = Instant::now();
    let result = match input.validate() {
        Ok((name, details, location)) => {
            run(state, &state.donations, name, details, location).await
        }
        Err(err) => Err(err),
    };
    observe(state, RecordKind::Donation, start, &result);
    result
}

pub async fn process_request(
    state: &AppState,
    input: RequestInput,
) -> Result<RequestRecord, AppError> {
    let start = Instant::now();
    let result = match input.validate() {
        Ok((name, details, location)) => {
            run(state, &state.requests, name, details, location).await
        }
        Err(err) => Err(err),
    };
    observe(state, RecordKind::Request, start, &result);
    result
}

/// Resolve, select, route, then store. Any failing stage aborts the rest and
/// nothing is persisted.
async fn run<D>(
    state: &AppState,
    store: &RecordStore<D>,
    submitter_name: String,
    details: D,
    location: LocationInput,
) -> Result<SubmissionRecord<D>, AppError>
where
    D: Clone + Serialize + DeserializeOwned + Send,
{
    let kind = store.kind();

    let origin = resolve_location(&state.geocoder, &state.metrics, &location).await?;
    let (warehouse, straight_line_km) = select_nearest(&state.warehouses, &origin)?;
    let route =
        annotate_route(&state.router, &state.metrics, origin, warehouse.location()).await?;

    let saved = store
        .save(NewSubmission {
            submitter_name,
            submitter_location: origin,
            submitter_address: location.address().map(|address| address.trim().to_string()),
            details,
            matched_warehouse: MatchedWarehouse::from_selection(warehouse, straight_line_km),
            route,
        })
        .await?;
    let record = saved.record;

    state
        .metrics
        .records_stored
        .with_label_values(&[kind.as_str()])
        .set(saved.total as i64);

    info!(
        kind = %kind,
        record_id = record.id,
        warehouse = %record.matched_warehouse.name,
        distance = %record.route.distance,
        duration = %record.route.duration,
        "submission matched"
    );

    Ok(record)
}

fn observe<T>(state: &AppState, kind: RecordKind, start: Instant, result: &Result<T, AppError>) {
    let elapsed = start.elapsed().as_secs_f64();
    let outcome = match result {
        Ok(_) => "success",
        Err(err) => err.kind(),
    };

    match result {
        Ok(_) => {}
        Err(err @ (AppError::NoWarehouseAvailable | AppError::Internal(_))) => {
            error!(kind = %kind, error = %err, "submission failed");
        }
        Err(err) => warn!(kind = %kind, error = %err, "submission rejected"),
    }

    state
        .metrics
        .pipeline_latency_seconds
        .with_label_values(&[kind.as_str(), outcome])
        .observe(elapsed);
    state
        .metrics
        .submissions_total
        .with_label_values(&[kind.as_str(), outcome])
        .inc();
}

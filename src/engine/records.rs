//! Review operations over stored submissions.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::error::AppError;
use crate::models::submission::{
    DonationDetails, RecordKind, RecordStatus, RequestDetails, SubmissionRecord,
};
use crate::state::AppState;
use crate::store::RecordStore;

/// A stored record as shown to reviewers, with display addresses attached.
#[derive(Debug, Clone, Serialize)]
pub struct ListedRecord<D> {
    #[serde(flatten)]
    pub record: SubmissionRecord<D>,
    pub warehouse_address: Option<String>,
}

pub async fn list_donations(state: &AppState) -> Vec<ListedRecord<DonationDetails>> {
    list(state, &state.donations).await
}

pub async fn list_requests(state: &AppState) -> Vec<ListedRecord<RequestDetails>> {
    list(state, &state.requests).await
}

pub async fn set_status(
    state: &AppState,
    kind: RecordKind,
    id: u64,
    status: RecordStatus,
) -> Result<(), AppError> {
    match kind {
        RecordKind::Donation => {
            state.donations.update_status(id, status).await?;
        }
        RecordKind::Request => {
            state.requests.update_status(id, status).await?;
        }
    }

    info!(kind = %kind, record_id = id, status = status.as_str(), "status updated");
    Ok(())
}

pub async fn delete_record(state: &AppState, kind: RecordKind, id: u64) -> Result<(), AppError> {
    let remaining = match kind {
        RecordKind::Donation => state.donations.delete(id).await?,
        RecordKind::Request => state.requests.delete(id).await?,
    };

    state
        .metrics
        .records_stored
        .with_label_values(&[kind.as_str()])
        .set(remaining as i64);
    Ok(())
}

/// Reverse geocoding here is display-only: lookups run after the store lock
/// is released and fall back to a placeholder instead of failing.
async fn list<D>(state: &AppState, store: &RecordStore<D>) -> Vec<ListedRecord<D>>
where
    D: Clone + Serialize + DeserializeOwned + Send,
{
    let records = store.list().await;
    let mut listed = Vec::with_capacity(records.len());

    for mut record in records {
        let warehouse_address = if state.enrich_addresses {
            if record.submitter_address.is_none() {
                record.submitter_address =
                    Some(state.geocoder.reverse(record.submitter_location).await);
            }
            Some(state.geocoder.reverse(record.matched_warehouse.location).await)
        } else {
            None
        };

        listed.push(ListedRecord {
            record,
            warehouse_address,
        });
    }

    listed
}

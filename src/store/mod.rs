//! Keyed record storage with dense 1-based identifiers.
//!
//! Each store serialises its writers behind one async mutex, so id
//! assignment and delete-triggered renumbering never interleave. Callers must
//! not hold a store across provider calls; the pipeline only touches the store
//! once every external lookup has finished.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::AppError;
use crate::models::submission::{NewSubmission, RecordKind, RecordStatus, SubmissionRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreState<D> {
    next_id: u64,
    /// Ascending by id; ids are always exactly `1..=records.len()`.
    records: Vec<SubmissionRecord<D>>,
}

impl<D> Default for StoreState<D> {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
        }
    }
}

/// A freshly saved record and the store size right after the insert.
#[derive(Debug, Clone)]
pub struct Saved<D> {
    pub record: SubmissionRecord<D>,
    pub total: usize,
}

pub struct RecordStore<D> {
    kind: RecordKind,
    state: Mutex<StoreState<D>>,
    snapshot_path: Option<PathBuf>,
}

impl<D> RecordStore<D>
where
    D: Clone + Serialize + DeserializeOwned + Send,
{
    pub fn in_memory(kind: RecordKind) -> Self {
        Self {
            kind,
            state: Mutex::new(StoreState::default()),
            snapshot_path: None,
        }
    }

    /// Opens a store snapshotted to `path`, loading it if the file exists.
    pub async fn open(kind: RecordKind, path: PathBuf) -> Result<Self, AppError> {
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                let mut state: StoreState<D> = serde_json::from_str(&raw).map_err(|err| {
                    AppError::Internal(format!("corrupt snapshot {}: {err}", path.display()))
                })?;
                state.records.sort_by_key(|record| record.id);
                renumber(&mut state);
                info!(
                    kind = %kind,
                    records = state.records.len(),
                    path = %path.display(),
                    "loaded record snapshot"
                );
                state
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreState::default(),
            Err(err) => {
                return Err(AppError::Internal(format!(
                    "failed to read snapshot {}: {err}",
                    path.display()
                )));
            }
        };

        Ok(Self {
            kind,
            state: Mutex::new(state),
            snapshot_path: Some(path),
        })
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Assigns the next id and persists the record as `Pending`.
    pub async fn save(&self, submission: NewSubmission<D>) -> Result<Saved<D>, AppError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();

        let record = SubmissionRecord {
            id: next.next_id,
            submitter_name: submission.submitter_name,
            submitter_location: submission.submitter_location,
            submitter_address: submission.submitter_address,
            details: submission.details,
            matched_warehouse: submission.matched_warehouse,
            route: submission.route,
            status: RecordStatus::Pending,
            created_at: Utc::now(),
        };
        next.records.push(record.clone());
        next.next_id += 1;

        self.persist(&next).await?;
        *state = next;

        debug!(kind = %self.kind, record_id = record.id, "record saved");
        Ok(Saved {
            record,
            total: state.records.len(),
        })
    }

    /// All records, newest first.
    pub async fn list(&self) -> Vec<SubmissionRecord<D>> {
        let state = self.state.lock().await;
        let mut records = state.records.clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        records
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    #[cfg(test)]
    async fn get(&self, id: u64) -> Option<SubmissionRecord<D>> {
        let state = self.state.lock().await;
        state.records.iter().find(|record| record.id == id).cloned()
    }

    #[cfg(test)]
    async fn next_id(&self) -> u64 {
        self.state.lock().await.next_id
    }

    pub async fn update_status(
        &self,
        id: u64,
        status: RecordStatus,
    ) -> Result<SubmissionRecord<D>, AppError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();

        let record = next
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| AppError::NotFound(format!("{} {id} not found", self.kind)))?;
        record.status = status;
        let updated = record.clone();

        self.persist(&next).await?;
        *state = next;

        Ok(updated)
    }

    /// Removes `id` and closes the gap so ids stay dense. Returns how many
    /// records remain.
    pub async fn delete(&self, id: u64) -> Result<usize, AppError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();

        let position = next
            .records
            .iter()
            .position(|record| record.id == id)
            .ok_or_else(|| AppError::NotFound(format!("{} {id} not found", self.kind)))?;
        next.records.remove(position);
        renumber(&mut next);

        self.persist(&next).await?;
        *state = next;

        info!(
            kind = %self.kind,
            record_id = id,
            remaining = state.records.len(),
            "record deleted and ids reassigned"
        );
        Ok(state.records.len())
    }

    async fn persist(&self, state: &StoreState<D>) -> Result<(), AppError> {
        match &self.snapshot_path {
            Some(path) => write_snapshot(path, state).await,
            None => Ok(()),
        }
    }
}

fn renumber<D>(state: &mut StoreState<D>) {
    for (index, record) in state.records.iter_mut().enumerate() {
        record.id = index as u64 + 1;
    }
    state.next_id = state.records.len() as u64 + 1;
}

async fn write_snapshot<D: Serialize>(
    path: &Path,
    state: &StoreState<D>,
) -> Result<(), AppError> {
    let body = serde_json::to_vec_pretty(state)
        .map_err(|err| AppError::Internal(format!("failed to encode snapshot: {err}")))?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body)
        .await
        .map_err(|err| {
            AppError::Internal(format!("failed to write {}: {err}", tmp.display()))
        })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|err| {
            AppError::Internal(format!("failed to replace {}: {err}", path.display()))
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::RecordStore;
    use crate::error::AppError;
    use crate::models::coordinate::Coordinate;
    use crate::models::route::RouteSummary;
    use crate::models::submission::{
        MatchedWarehouse, NewSubmission, RecordKind, RecordStatus, RequestDetails,
    };

    fn submission(name: &str) -> NewSubmission<RequestDetails> {
        let origin = Coordinate::new(10.77, 106.69);
        NewSubmission {
            submitter_name: name.to_string(),
            submitter_location: origin,
            submitter_address: None,
            details: RequestDetails {
                dry_food_qty: 1.0,
                fresh_food_qty: 0.0,
                canned_food_qty: 0.0,
                milk_cold_qty: 0.0,
                spice_qty: 0.0,
            },
            matched_warehouse: MatchedWarehouse {
                name: "Foodbank Quận 1".to_string(),
                location: Coordinate::new(10.7707525, 106.6976235),
                straight_line_km: 0.8,
            },
            route: RouteSummary::degenerate(origin),
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_from_one() {
        let store = RecordStore::in_memory(RecordKind::Request);
        assert_eq!(store.save(submission("a")).await.unwrap().record.id, 1);
        assert_eq!(store.save(submission("b")).await.unwrap().record.id, 2);
        assert_eq!(store.next_id().await, 3);
    }

    #[tokio::test]
    async fn saved_record_lists_unchanged_and_pending() {
        let store = RecordStore::in_memory(RecordKind::Request);
        let saved = store.save(submission("Lan")).await.unwrap().record;

        let listed = store.list().await;
        assert_eq!(listed, vec![saved.clone()]);
        assert_eq!(listed[0].status, RecordStatus::Pending);
        assert_eq!(listed[0].route.path, saved.route.path);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = RecordStore::in_memory(RecordKind::Request);
        for name in ["a", "b", "c"] {
            store.save(submission(name)).await.unwrap();
        }

        let names: Vec<_> = store
            .list()
            .await
            .into_iter()
            .map(|record| record.submitter_name)
            .collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn delete_renumbers_and_resets_counter() {
        let store = RecordStore::in_memory(RecordKind::Request);
        for name in ["a", "b", "c"] {
            store.save(submission(name)).await.unwrap();
        }

        assert_eq!(store.delete(2).await.unwrap(), 2);

        let first = store.get(1).await.unwrap();
        let second = store.get(2).await.unwrap();
        assert_eq!(first.submitter_name, "a");
        assert_eq!(second.submitter_name, "c");
        assert!(store.get(3).await.is_none());

        assert_eq!(store.save(submission("d")).await.unwrap().record.id, 3);
    }

    #[tokio::test]
    async fn save_reports_size_under_the_same_lock() {
        let store = std::sync::Arc::new(RecordStore::in_memory(RecordKind::Request));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.save(submission(&i.to_string())).await.unwrap()
                })
            })
            .collect();

        let mut totals = Vec::new();
        for handle in handles {
            let saved = handle.await.unwrap();
            assert_eq!(saved.total as u64, saved.record.id);
            totals.push(saved.total);
        }
        totals.sort();
        assert_eq!(totals, (1..=8).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let store = RecordStore::<RequestDetails>::in_memory(RecordKind::Request);
        assert!(matches!(store.delete(7).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            store.update_status(7, RecordStatus::Processed).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn status_update_touches_only_status() {
        let store = RecordStore::in_memory(RecordKind::Request);
        let saved = store.save(submission("a")).await.unwrap().record;

        let updated = store.update_status(1, RecordStatus::PickedUp).await.unwrap();
        assert_eq!(updated.status, RecordStatus::PickedUp);
        assert_eq!(updated.created_at, saved.created_at);
        assert_eq!(updated.route, saved.route);
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requests.json");

        let store = RecordStore::open(RecordKind::Request, path.clone()).await.unwrap();
        store.save(submission("a")).await.unwrap();
        store.save(submission("b")).await.unwrap();
        store.delete(1).await.unwrap();
        drop(store);

        let reopened = RecordStore::<RequestDetails>::open(RecordKind::Request, path)
            .await
            .unwrap();
        let records = reopened.list().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].submitter_name, "b");
        assert_eq!(reopened.next_id().await, 2);
    }
}

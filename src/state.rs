use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::models::submission::{DonationDetails, RecordKind, RequestDetails};
use crate::models::warehouse::Warehouse;
use crate::observability::metrics::Metrics;
use crate::providers::nominatim::NominatimClient;
use crate::providers::osrm::OsrmClient;
use crate::store::RecordStore;

pub struct AppState {
    pub warehouses: Arc<[Warehouse]>,
    pub geocoder: NominatimClient,
    pub router: OsrmClient,
    pub donations: RecordStore<DonationDetails>,
    pub requests: RecordStore<RequestDetails>,
    pub enrich_addresses: bool,
    pub metrics: Metrics,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let geocoder = NominatimClient::new(
            &config.nominatim_url,
            config.geocode_timeout_secs,
            &config.user_agent,
        )
        .map_err(|err| AppError::Internal(format!("failed to build geocoding client: {err}")))?;

        let router = OsrmClient::new(
            &config.osrm_url,
            &config.osrm_profile,
            config.routing_timeout_secs,
            &config.user_agent,
        )
        .map_err(|err| AppError::Internal(format!("failed to build routing client: {err}")))?;

        let (donations, requests) = match &config.data_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await.map_err(|err| {
                    AppError::Internal(format!("failed to create {}: {err}", dir.display()))
                })?;
                (
                    RecordStore::open(RecordKind::Donation, dir.join("donations.json")).await?,
                    RecordStore::open(RecordKind::Request, dir.join("requests.json")).await?,
                )
            }
            None => (
                RecordStore::in_memory(RecordKind::Donation),
                RecordStore::in_memory(RecordKind::Request),
            ),
        };

        let metrics = Metrics::new();
        metrics
            .records_stored
            .with_label_values(&[RecordKind::Donation.as_str()])
            .set(donations.len().await as i64);
        metrics
            .records_stored
            .with_label_values(&[RecordKind::Request.as_str()])
            .set(requests.len().await as i64);

        Ok(Self {
            warehouses: config.warehouses.clone(),
            geocoder,
            router,
            donations,
            requests,
            enrich_addresses: config.enrich_addresses,
            metrics,
        })
    }
}

//! Client for an OpenStreetMap Nominatim geocoding server.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::coordinate::Coordinate;
use crate::providers::{build_client, normalise_base_url, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const UNKNOWN_ADDRESS: &str = "Unknown address";

/// How long a failed reverse lookup is answered from cache before retrying.
const FAILED_LOOKUP_TTL: Duration = Duration::from_secs(60);
const REVERSE_CACHE_CAPACITY: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeCandidate {
    pub coordinate: Coordinate,
    pub display_name: Option<String>,
}

// Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseHit {
    display_name: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedAddress {
    address: String,
    /// `None` for resolved addresses, which never go stale.
    expires_at: Option<Instant>,
}

impl CachedAddress {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

pub struct NominatimClient {
    client: Client,
    base_url: String,
    reverse_cache: DashMap<(i64, i64), CachedAddress>,
}

impl NominatimClient {
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            base_url: normalise_base_url(base_url),
            reverse_cache: DashMap::new(),
        })
    }

    /// Forward-geocodes `address`; an empty vector means no match.
    pub async fn search(&self, address: &str) -> Result<Vec<GeocodeCandidate>, ProviderError> {
        let url = format!("{}/search", self.base_url);
        debug!(address, "calling nominatim search");

        let response = self
            .client
            .get(&url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                detail: None,
            });
        }

        let hits: Vec<SearchHit> = serde_json::from_str(&text)?;
        hits.into_iter()
            .map(|hit| {
                let lat = hit.lat.trim().parse::<f64>();
                let lon = hit.lon.trim().parse::<f64>();
                match (lat, lon) {
                    (Ok(lat), Ok(lon)) => Ok(GeocodeCandidate {
                        coordinate: Coordinate::new(lat, lon),
                        display_name: hit.display_name,
                    }),
                    _ => Err(ProviderError::Api(format!(
                        "non-numeric coordinates in result: ({}, {})",
                        hit.lat, hit.lon
                    ))),
                }
            })
            .collect()
    }

    /// Best-effort display address for `coordinate`. Never fails; falls back
    /// to [`UNKNOWN_ADDRESS`]. Fallbacks are cached for [`FAILED_LOOKUP_TTL`].
    pub async fn reverse(&self, coordinate: Coordinate) -> String {
        let key = cache_key(&coordinate);
        let now = Instant::now();
        if let Some(cached) = self.reverse_cache.get(&key) {
            if cached.is_fresh(now) {
                return cached.address.clone();
            }
        }

        let cached = match self.fetch_reverse(coordinate).await {
            Ok(Some(name)) => CachedAddress {
                address: name,
                expires_at: None,
            },
            Ok(None) => CachedAddress {
                address: UNKNOWN_ADDRESS.to_string(),
                expires_at: Some(Instant::now() + FAILED_LOOKUP_TTL),
            },
            Err(err) => {
                warn!(error = %err, %coordinate, "reverse geocoding failed");
                CachedAddress {
                    address: UNKNOWN_ADDRESS.to_string(),
                    expires_at: Some(Instant::now() + FAILED_LOOKUP_TTL),
                }
            }
        };

        self.remember(key, cached.clone());
        cached.address
    }

    fn remember(&self, key: (i64, i64), entry: CachedAddress) {
        if self.reverse_cache.len() >= REVERSE_CACHE_CAPACITY {
            self.reverse_cache.retain(|_, cached| cached.expires_at.is_none());
            if self.reverse_cache.len() >= REVERSE_CACHE_CAPACITY {
                debug!(entries = self.reverse_cache.len(), "reverse cache full; clearing");
                self.reverse_cache.clear();
            }
        }
        self.reverse_cache.insert(key, entry);
    }

    async fn fetch_reverse(&self, coordinate: Coordinate) -> Result<Option<String>, ProviderError> {
        let url = format!("{}/reverse", self.base_url);
        let lat = coordinate.lat.to_string();
        let lon = coordinate.lon.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("lat", lat.as_str()), ("lon", lon.as_str()), ("format", "json")])
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        let hit: ReverseHit = serde_json::from_str(&text)?;
        Ok(hit.display_name)
    }
}

fn cache_key(coordinate: &Coordinate) -> (i64, i64) {
    (
        (coordinate.lat * 1e6).round() as i64,
        (coordinate.lon * 1e6).round() as i64,
    )
}

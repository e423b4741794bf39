use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::warehouse::{default_warehouses, Warehouse};
use crate::providers::{nominatim, osrm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub nominatim_url: String,
    pub osrm_url: String,
    pub osrm_profile: String,
    pub geocode_timeout_secs: u64,
    pub routing_timeout_secs: u64,
    pub user_agent: String,
    pub data_dir: Option<PathBuf>,
    pub enrich_addresses: bool,
    pub warehouses: Arc<[Warehouse]>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") | Err(_) => LogFormat::Compact,
            Ok(other) => {
                return Err(AppError::Internal(format!(
                    "invalid LOG_FORMAT: {other} (expected compact or json)"
                )));
            }
        };

        let warehouses = match env::var("WAREHOUSES_FILE") {
            Ok(path) => load_warehouses(Path::new(&path))?,
            Err(_) => default_warehouses(),
        };

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 5000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format,
            nominatim_url: env::var("NOMINATIM_URL")
                .unwrap_or_else(|_| nominatim::DEFAULT_BASE_URL.to_string()),
            osrm_url: env::var("OSRM_URL").unwrap_or_else(|_| osrm::DEFAULT_BASE_URL.to_string()),
            osrm_profile: env::var("OSRM_PROFILE")
                .unwrap_or_else(|_| osrm::DEFAULT_PROFILE.to_string()),
            geocode_timeout_secs: parse_or_default("GEOCODE_TIMEOUT_SECS", 5)?,
            routing_timeout_secs: parse_or_default("ROUTING_TIMEOUT_SECS", 5)?,
            user_agent: env::var("HTTP_USER_AGENT")
                .unwrap_or_else(|_| "CharityDonationApp".to_string()),
            data_dir: env::var("DATA_DIR").ok().map(PathBuf::from),
            enrich_addresses: parse_or_default("ENRICH_ADDRESSES", true)?,
            warehouses: warehouses.into(),
        })
    }

    /// Defaults suitable for tests: providers at the given base URLs, no
    /// snapshots, no listing enrichment.
    pub fn for_providers(nominatim_url: &str, osrm_url: &str) -> Self {
        Self {
            http_port: 0,
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            nominatim_url: nominatim_url.to_string(),
            osrm_url: osrm_url.to_string(),
            osrm_profile: osrm::DEFAULT_PROFILE.to_string(),
            geocode_timeout_secs: 5,
            routing_timeout_secs: 5,
            user_agent: "donation-router-test".to_string(),
            data_dir: None,
            enrich_addresses: false,
            warehouses: default_warehouses().into(),
        }
    }
}

/// Reads a JSON array of `{name, lat, lon}` and range-checks every entry.
pub fn load_warehouses(path: &Path) -> Result<Vec<Warehouse>, AppError> {
    let raw = std::fs::read_to_string(path).map_err(|err| {
        AppError::Internal(format!("failed to read {}: {err}", path.display()))
    })?;

    let warehouses: Vec<Warehouse> = serde_json::from_str(&raw).map_err(|err| {
        AppError::Internal(format!("invalid warehouses file {}: {err}", path.display()))
    })?;

    if let Some(bad) = warehouses.iter().find(|w| !w.location().is_valid()) {
        return Err(AppError::Internal(format!(
            "warehouse '{}' has out-of-range coordinates {}",
            bad.name,
            bad.location()
        )));
    }

    Ok(warehouses)
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::load_warehouses;

    #[test]
    fn loads_warehouses_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Kho A", "lat": 10.5, "lon": 106.5}}, {{"name": "Kho B", "lat": 11.0, "lon": 107.0}}]"#
        )
        .unwrap();

        let warehouses = load_warehouses(file.path()).unwrap();
        assert_eq!(warehouses.len(), 2);
        assert_eq!(warehouses[1].name, "Kho B");
    }

    #[test]
    fn rejects_out_of_range_warehouse() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"name": "Nowhere", "lat": 95.0, "lon": 0.0}}]"#).unwrap();

        assert!(load_warehouses(file.path()).is_err());
    }
}

use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::coordinate::Coordinate;
use crate::models::submission::LocationInput;
use crate::observability::metrics::Metrics;
use crate::providers::nominatim::NominatimClient;

/// Turns a submission's location fields into validated coordinates.
///
/// Explicit coordinates are used as given; an address costs one geocoding
/// call and takes the first candidate.
pub async fn resolve_location(
    geocoder: &NominatimClient,
    metrics: &Metrics,
    location: &LocationInput,
) -> Result<Coordinate, AppError> {
    match location {
        LocationInput::Coordinates {
            latitude,
            longitude,
        } => {
            let coordinate = Coordinate::new(
                latitude.to_f64("latitude")?,
                longitude.to_f64("longitude")?,
            );
            if !coordinate.is_valid() {
                return Err(AppError::InvalidInput(format!(
                    "coordinates out of range: {coordinate}"
                )));
            }
            Ok(coordinate)
        }
        LocationInput::Address(address) => geocode(geocoder, metrics, address).await,
        LocationInput::Missing => Err(AppError::InvalidInput(
            "provide either latitude/longitude or address".to_string(),
        )),
    }
}

async fn geocode(
    geocoder: &NominatimClient,
    metrics: &Metrics,
    address: &str,
) -> Result<Coordinate, AppError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(AppError::InvalidInput("address cannot be empty".to_string()));
    }

    let candidates = geocoder.search(address).await.map_err(|err| {
        metrics.record_provider_call("nominatim", false);
        warn!(error = %err, address, "geocoding request failed");
        AppError::GeocodeFailure(err.to_string())
    })?;
    metrics.record_provider_call("nominatim", true);

    let first = candidates
        .first()
        .ok_or_else(|| AppError::GeocodeFailure("No results found for address".to_string()))?;

    if !first.coordinate.is_valid() {
        return Err(AppError::GeocodeFailure(format!(
            "Invalid coordinates: {}",
            first.coordinate
        )));
    }

    debug!(address, coordinate = %first.coordinate, "address geocoded");
    Ok(first.coordinate)
}

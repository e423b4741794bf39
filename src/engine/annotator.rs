use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::coordinate::Coordinate;
use crate::models::route::{format_km, format_mins, RouteStep, RouteSummary};
use crate::observability::metrics::Metrics;
use crate::providers::osrm::{OsrmClient, Route};
use crate::providers::ProviderError;

/// Per-axis tolerance, in degrees, under which two points are the same place.
pub const SAME_LOCATION_TOLERANCE_DEG: f64 = 1e-6;

const DEFAULT_INSTRUCTION: &str = "Proceed";

/// Routes `origin` to `destination` and normalizes the provider's answer.
///
/// Coinciding endpoints short-circuit to [`RouteSummary::degenerate`] without
/// contacting the provider. There is no retry; a failed or timed-out call is
/// reported as [`AppError::RoutingService`].
pub async fn annotate_route(
    router: &OsrmClient,
    metrics: &Metrics,
    origin: Coordinate,
    destination: Coordinate,
) -> Result<RouteSummary, AppError> {
    if !origin.is_valid() || !destination.is_valid() {
        return Err(AppError::InvalidCoordinates(format!(
            "origin {origin} or destination {destination} is out of range"
        )));
    }

    if origin.approx_eq(&destination, SAME_LOCATION_TOLERANCE_DEG) {
        debug!(%origin, "origin coincides with destination; skipping routing call");
        return Ok(RouteSummary::degenerate(origin));
    }

    let result = router
        .route(origin, destination)
        .await
        .and_then(|route| summarize(&route));
    metrics.record_provider_call("osrm", result.is_ok());

    result.map_err(|err| {
        warn!(error = %err, %origin, %destination, "routing request failed");
        routing_error(err)
    })
}

/// Converts a raw provider route into display units and a (lat, lon) path.
pub fn summarize(route: &Route) -> Result<RouteSummary, ProviderError> {
    let path = route.geometry.to_path()?;
    if path.is_empty() {
        return Err(ProviderError::Api("route geometry is empty".to_string()));
    }
    if let Some(point) = path.iter().find(|point| !point.is_valid()) {
        return Err(ProviderError::Api(format!(
            "route geometry has out-of-range point {point}"
        )));
    }

    let steps = route
        .legs
        .first()
        .map(|leg| {
            leg.steps
                .iter()
                .map(|step| RouteStep {
                    instruction: step
                        .maneuver
                        .instruction
                        .clone()
                        .unwrap_or_else(|| DEFAULT_INSTRUCTION.to_string()),
                    distance: format_km(step.distance),
                    duration: format_mins(step.duration),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(RouteSummary {
        distance: format_km(route.distance),
        duration: format_mins(route.duration),
        path,
        steps,
    })
}

fn routing_error(err: ProviderError) -> AppError {
    let message = match &err {
        ProviderError::Http(inner) if inner.is_timeout() => {
            format!("OSRM request timed out: {inner}")
        }
        ProviderError::Http(inner) => format!("OSRM network error: {inner}"),
        ProviderError::Status { .. } => format!("OSRM request failed: {err}"),
        ProviderError::Deserialize(inner) => {
            format!("OSRM returned a malformed response: {inner}")
        }
        ProviderError::Api(message) => format!("OSRM error: {message}"),
    };
    AppError::RoutingService(message)
}

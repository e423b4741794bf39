//! Client for the OSRM HTTP route service.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::models::coordinate::Coordinate;
use crate::providers::polyline::{self, OSRM_PRECISION};
use crate::providers::{build_client, normalise_base_url, ProviderError};

pub const DEFAULT_BASE_URL: &str = "http://router.project-osrm.org";
pub const DEFAULT_PROFILE: &str = "driving";

#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    pub code: String,
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
pub struct Route {
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
    pub geometry: Geometry,
    #[serde(default)]
    pub legs: Vec<Leg>,
}

/// `geometries=polyline` (the default) yields a string; `geometries=geojson`
/// yields a LineString of (lon, lat) pairs.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Geometry {
    Encoded(String),
    LineString { coordinates: Vec<[f64; 2]> },
}

impl Geometry {
    /// Decodes into an ordered (lat, lon) path.
    pub fn to_path(&self) -> Result<Vec<Coordinate>, ProviderError> {
        match self {
            Geometry::Encoded(encoded) => polyline::decode(encoded, OSRM_PRECISION),
            Geometry::LineString { coordinates } => Ok(coordinates
                .iter()
                .map(|[lon, lat]| Coordinate::new(*lat, *lon))
                .collect()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Leg {
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
pub struct Step {
    pub distance: f64,
    pub duration: f64,
    #[serde(default)]
    pub maneuver: Maneuver,
}

#[derive(Debug, Default, Deserialize)]
pub struct Maneuver {
    pub instruction: Option<String>,
}

pub struct OsrmClient {
    client: Client,
    base_url: String,
    profile: String,
}

impl OsrmClient {
    pub fn new(
        base_url: &str,
        profile: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            base_url: normalise_base_url(base_url),
            profile: profile.to_string(),
        })
    }

    /// Requests a full-geometry, step-level route and returns the first one.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::Http`] on network failure or timeout.
    /// - [`ProviderError::Status`] on a non-2xx response.
    /// - [`ProviderError::Deserialize`] if the body is not a route response.
    /// - [`ProviderError::Api`] if the response code is not `Ok` or no route
    ///   was returned.
    pub async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Route, ProviderError> {
        // OSRM takes lon,lat pairs.
        let url = format!(
            "{}/route/v1/{}/{},{};{},{}",
            self.base_url, self.profile, origin.lon, origin.lat, destination.lon, destination.lat
        );
        debug!(%url, "calling osrm route");

        let response = self
            .client
            .get(&url)
            .query(&[("overview", "full"), ("steps", "true")])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<RouteResponse>(&text)
                .ok()
                .map(|body| describe(&body.code, body.message.as_deref()));
            return Err(ProviderError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let body: RouteResponse = serde_json::from_str(&text)?;
        if body.code != "Ok" {
            return Err(ProviderError::Api(describe(&body.code, body.message.as_deref())));
        }

        body.routes
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Api("no routes returned".to_string()))
    }
}

fn describe(code: &str, message: Option<&str>) -> String {
    match message {
        Some(message) => format!("{code}: {message}"),
        None => code.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Geometry, RouteResponse};

    #[test]
    fn geojson_geometry_is_flipped_to_lat_lon() {
        let geometry: Geometry = serde_json::from_value(json!({
            "type": "LineString",
            "coordinates": [[106.0, 10.0], [106.7, 10.8]]
        }))
        .unwrap();

        let path = geometry.to_path().unwrap();
        assert_eq!(path[0].lat, 10.0);
        assert_eq!(path[0].lon, 106.0);
        assert_eq!(path[1].lat, 10.8);
    }

    #[test]
    fn missing_maneuver_instruction_is_tolerated() {
        let body: RouteResponse = serde_json::from_value(json!({
            "code": "Ok",
            "routes": [{
                "distance": 1200.0,
                "duration": 180.0,
                "geometry": "_p~iF~ps|U",
                "legs": [{ "steps": [{ "distance": 1200.0, "duration": 180.0, "maneuver": { "type": "depart" } }] }]
            }]
        }))
        .unwrap();

        let step = &body.routes[0].legs[0].steps[0];
        assert!(step.maneuver.instruction.is_none());
    }
}

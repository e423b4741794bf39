use serde::{Deserialize, Serialize};

use crate::models::coordinate::Coordinate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    pub distance: String,
    pub duration: String,
}

/// Normalized result of a directions query.
///
/// `path` is never empty and is always ordered (lat, lon).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub distance: String,
    pub duration: String,
    pub path: Vec<Coordinate>,
    pub steps: Vec<RouteStep>,
}

impl RouteSummary {
    /// Zero-length route used when origin and destination coincide.
    pub fn degenerate(at: Coordinate) -> Self {
        Self {
            distance: "0 km".to_string(),
            duration: "0 mins".to_string(),
            path: vec![at],
            steps: vec![RouteStep {
                instruction: "No route needed (same location)".to_string(),
                distance: "0 km".to_string(),
                duration: "0 mins".to_string(),
            }],
        }
    }
}

pub fn format_km(meters: f64) -> String {
    format!("{:.1} km", meters / 1000.0)
}

pub fn format_mins(seconds: f64) -> String {
    format!("{:.1} mins", seconds / 60.0)
}

#[cfg(test)]
mod tests {
    use super::{format_km, format_mins, RouteSummary};
    use crate::models::coordinate::Coordinate;

    #[test]
    fn formats_to_one_decimal() {
        assert_eq!(format_km(5000.0), "5.0 km");
        assert_eq!(format_km(3249.0), "3.2 km");
        assert_eq!(format_mins(600.0), "10.0 mins");
        assert_eq!(format_mins(444.0), "7.4 mins");
    }

    #[test]
    fn degenerate_route_has_single_point_and_step() {
        let at = Coordinate::new(10.0, 106.0);
        let route = RouteSummary::degenerate(at);
        assert_eq!(route.path, vec![at]);
        assert_eq!(route.steps.len(), 1);
        assert_eq!(route.distance, "0 km");
    }
}

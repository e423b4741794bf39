use crate::models::coordinate::Coordinate;

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Great-circle distance in kilometres. Out-of-range input is not rejected
/// here; NaN propagates to the result.
pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lon = (delta_lon / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lon * sin_lon;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

#[cfg(test)]
mod tests {
    use super::haversine_km;
    use crate::models::coordinate::Coordinate;

    fn within_tenth_of_percent(actual: f64, expected: f64) -> bool {
        ((actual - expected) / expected).abs() < 0.001
    }

    #[test]
    fn zero_distance_for_same_point() {
        let p = Coordinate::new(10.7707525, 106.6976235);
        assert_eq!(haversine_km(&p, &p), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate::new(10.0, 106.0);
        let b = Coordinate::new(-33.8688, 151.2093);
        assert_eq!(haversine_km(&a, &b), haversine_km(&b, &a));
    }

    #[test]
    fn london_to_paris_matches_reference() {
        let london = Coordinate::new(51.5074, -0.1278);
        let paris = Coordinate::new(48.8566, 2.3522);
        assert!(within_tenth_of_percent(haversine_km(&london, &paris), 343.556));
    }

    #[test]
    fn saigon_to_hanoi_matches_reference() {
        let saigon = Coordinate::new(10.7769, 106.7009);
        let hanoi = Coordinate::new(21.0278, 105.8342);
        assert!(within_tenth_of_percent(haversine_km(&saigon, &hanoi), 1143.598));
    }

    #[test]
    fn nan_input_propagates() {
        let a = Coordinate::new(f64::NAN, 0.0);
        let b = Coordinate::new(0.0, 0.0);
        assert!(haversine_km(&a, &b).is_nan());
    }
}

use crate::error::AppError;
use crate::geo::haversine_km;
use crate::models::coordinate::Coordinate;
use crate::models::warehouse::Warehouse;

/// Picks the warehouse closest to `point` by great-circle distance.
///
/// Only a strictly smaller distance replaces the current best, so the earlier
/// warehouse wins a tie.
pub fn select_nearest<'a>(
    warehouses: &'a [Warehouse],
    point: &Coordinate,
) -> Result<(&'a Warehouse, f64), AppError> {
    let mut nearest = None;
    let mut min_km = f64::INFINITY;

    for warehouse in warehouses {
        let distance_km = haversine_km(point, &warehouse.location());
        if distance_km < min_km {
            min_km = distance_km;
            nearest = Some(warehouse);
        }
    }

    nearest
        .map(|warehouse| (warehouse, min_km))
        .ok_or(AppError::NoWarehouseAvailable)
}

#[cfg(test)]
mod tests {
    use super::select_nearest;
    use crate::error::AppError;
    use crate::models::coordinate::Coordinate;
    use crate::models::warehouse::{default_warehouses, Warehouse};

    #[test]
    fn picks_closest_default_warehouse() {
        let warehouses = default_warehouses();
        let (nearest, km) = select_nearest(&warehouses, &Coordinate::new(10.0, 106.0)).unwrap();

        assert_eq!(nearest.name, "Foodbank Quận 1");
        assert!((km - 114.747).abs() < 0.1);
    }

    #[test]
    fn point_at_a_warehouse_selects_it_with_zero_distance() {
        let warehouses = default_warehouses();
        let at = warehouses[2].location();
        let (nearest, km) = select_nearest(&warehouses, &at).unwrap();

        assert_eq!(nearest.name, "Foodbank Quận Bình Thạnh");
        assert_eq!(km, 0.0);
    }

    #[test]
    fn earlier_warehouse_wins_a_tie() {
        let east = Warehouse::new("east", 0.0, 1.0);
        let west = Warehouse::new("west", 0.0, -1.0);
        let origin = Coordinate::new(0.0, 0.0);

        let forward = [east.clone(), west.clone()];
        assert_eq!(select_nearest(&forward, &origin).unwrap().0.name, "east");

        let reversed = [west, east];
        assert_eq!(select_nearest(&reversed, &origin).unwrap().0.name, "west");
    }

    #[test]
    fn empty_list_has_no_warehouse() {
        let result = select_nearest(&[], &Coordinate::new(10.0, 106.0));
        assert!(matches!(result, Err(AppError::NoWarehouseAvailable)));
    }
}

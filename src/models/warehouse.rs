use serde::{Deserialize, Serialize};

use crate::models::coordinate::Coordinate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Warehouse {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }

    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// The food-bank warehouses used when no `WAREHOUSES_FILE` is configured.
pub fn default_warehouses() -> Vec<Warehouse> {
    vec![
        Warehouse::new("Foodbank kho chính", 10.85609385, 106.7652264),
        Warehouse::new("Foodbank Quận 1", 10.7707525, 106.6976235),
        Warehouse::new("Foodbank Quận Bình Thạnh", 10.80484845, 106.71676215550468),
    ]
}

use serde::{Deserialize, Serialize};

/// A lat/lng pair. Unknown locations are `Option<Coordinate>`, never a
/// magic value; the upstream telemetry feed still emits (0, 0) for "no fix",
/// so that point is rejected by `is_valid`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns the coordinate only when it passes `is_valid`.
    pub fn checked(lat: f64, lng: f64) -> Option<Self> {
        let coord = Self { lat, lng };
        coord.is_valid().then_some(coord)
    }

    pub fn is_valid(&self) -> bool {
        let in_bounds = (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng);
        let null_island = self.lat == 0.0 && self.lng == 0.0;
        in_bounds && !null_island
    }
}

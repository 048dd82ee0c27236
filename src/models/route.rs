use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::coordinate::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegKind {
    Pickup,
    Delivery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteLeg {
    pub location: Option<Coordinate>,
    pub kind: LegKind,
    pub order_id: Option<Uuid>,
    pub address: String,
    pub eta_seconds: f64,
}

/// Per-driver route for one dispatch. When `degraded` the distance, time and
/// single leg are defaults substituted for missing routing data, not real
/// road geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub driver_id: Uuid,
    pub driver_name: String,
    pub legs: Vec<RouteLeg>,
    pub total_distance_meters: f64,
    pub total_time_seconds: f64,
    pub total_earnings: f64,
    pub degraded: bool,
}

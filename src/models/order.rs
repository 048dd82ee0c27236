use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::coordinate::Coordinate;

/// Order lifecycle statuses as written by staff and driver apps. This core
/// only reads them; no transition table is enforced here, the external store
/// accepts any status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Assigned,
    Accepted,
    PickedUp,
    InTransit,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Terminal for ETA purposes: no further movement is expected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether the driver is already moving with the order on board.
    pub fn is_en_route(&self) -> bool {
        matches!(self, OrderStatus::PickedUp | OrderStatus::InTransit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub status: OrderStatus,
    pub driver_id: Option<Uuid>,
    pub driver_location: Option<Coordinate>,
    pub destination: Coordinate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

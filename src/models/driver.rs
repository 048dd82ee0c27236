use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::coordinate::Coordinate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub location: Option<Coordinate>,
    pub is_online: bool,
    pub is_available: bool,
    pub current_order: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl Driver {
    /// Drivers the assignment engine may give work to.
    pub fn is_dispatchable(&self) -> bool {
        self.is_online && self.is_available
    }

    /// Location, filtered through coordinate validity. A driver whose feed
    /// reports (0, 0) or out-of-range values is treated as unlocated.
    pub fn known_location(&self) -> Option<Coordinate> {
        self.location.filter(Coordinate::is_valid)
    }
}

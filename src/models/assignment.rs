use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::delivery::Delivery;

/// Driver id to ordered deliveries, recomputed on every dispatch call.
/// Never persisted as its own entity; only `Order::driver_id` is durable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentPlan {
    pub by_driver: HashMap<Uuid, Vec<Delivery>>,
}

impl AssignmentPlan {
    pub fn push(&mut self, driver_id: Uuid, delivery: Delivery) {
        self.by_driver.entry(driver_id).or_default().push(delivery);
    }

    pub fn deliveries_for(&self, driver_id: &Uuid) -> &[Delivery] {
        self.by_driver.get(driver_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn load_of(&self, driver_id: &Uuid) -> usize {
        self.by_driver.get(driver_id).map(Vec::len).unwrap_or(0)
    }

    pub fn total_deliveries(&self) -> usize {
        self.by_driver.values().map(Vec::len).sum()
    }
}

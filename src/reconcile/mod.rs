//! Keeps in-memory driver and order views fresh without disturbing the rest
//! of a record. Two timers run independently: a full-list refresh on a slow
//! cadence and a location-only refresh on a tight one, so a slow full fetch
//! never delays GPS updates. Updates merge last-write-wins by their own
//! timestamp, which stops a stale push event from clobbering a newer poll.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::DispatchError;
use crate::models::coordinate::Coordinate;
use crate::models::driver::Driver;
use crate::models::order::{Order, OrderStatus};

#[derive(Debug, Clone)]
pub struct DriverLocationUpdate {
    pub driver_id: Uuid,
    pub location: Option<Coordinate>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct OrderLocationUpdate {
    pub order_id: Uuid,
    pub driver_location: Option<Coordinate>,
    pub status: OrderStatus,
    pub recorded_at: DateTime<Utc>,
}

/// The external store / telemetry collaborator.
pub trait LocationFeed {
    fn fetch_drivers(&self) -> impl Future<Output = Result<Vec<Driver>, DispatchError>> + Send;

    fn fetch_orders(&self) -> impl Future<Output = Result<Vec<Order>, DispatchError>> + Send;

    fn fetch_driver_locations(
        &self,
    ) -> impl Future<Output = Result<Vec<DriverLocationUpdate>, DispatchError>> + Send;

    fn fetch_order_locations(
        &self,
    ) -> impl Future<Output = Result<Vec<OrderLocationUpdate>, DispatchError>> + Send;
}

pub struct LocationReconciler<F> {
    feed: F,
    pub drivers: DashMap<Uuid, Driver>,
    pub orders: DashMap<Uuid, Order>,
    full_refresh: Duration,
    location_refresh: Duration,
    cancel: CancellationToken,
}

impl<F: LocationFeed> LocationReconciler<F> {
    pub fn new(feed: F, config: &Config, cancel: CancellationToken) -> Self {
        Self {
            feed,
            drivers: DashMap::new(),
            orders: DashMap::new(),
            full_refresh: config.full_refresh,
            location_refresh: config.location_refresh,
            cancel,
        }
    }

    /// Drives both refresh loops until the token is cancelled. The loops are
    /// polled together, so a feed call stuck in one never starves the other.
    pub async fn run(&self) {
        tokio::join!(self.run_full(), self.run_locations());
    }

    pub async fn run_full(&self) {
        let mut ticker = tokio::time::interval(self.full_refresh);
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = ticker.tick() => self.refresh_all().await,
            }
        }
    }

    pub async fn run_locations(&self) {
        let mut ticker = tokio::time::interval(self.location_refresh);
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = ticker.tick() => self.refresh_locations().await,
            }
        }
    }

    /// Full-list refresh. Never raises; a failed fetch skips the tick.
    pub async fn refresh_all(&self) {
        match self.feed.fetch_drivers().await {
            Ok(drivers) => {
                for driver in drivers {
                    self.merge_driver_snapshot(driver);
                }
            }
            Err(err) => warn!(error = %err, "driver list refresh failed"),
        }

        match self.feed.fetch_orders().await {
            Ok(orders) => {
                for order in orders {
                    self.merge_order_snapshot(order);
                }
            }
            Err(err) => warn!(error = %err, "order list refresh failed"),
        }
    }

    /// Location-only refresh on the tight cadence.
    pub async fn refresh_locations(&self) {
        match self.feed.fetch_driver_locations().await {
            Ok(updates) => {
                for update in updates {
                    self.apply_driver_location(update);
                }
            }
            Err(err) => warn!(error = %err, "driver location refresh failed"),
        }

        match self.feed.fetch_order_locations().await {
            Ok(updates) => {
                for update in updates {
                    self.apply_order_location(update);
                }
            }
            Err(err) => warn!(error = %err, "order location refresh failed"),
        }
    }

    /// Merges a full driver record. Existing records only take the
    /// location-bearing fields, and only when the snapshot is newer, so
    /// identity-sensitive consumer state survives the refresh.
    pub fn merge_driver_snapshot(&self, incoming: Driver) {
        match self.drivers.get_mut(&incoming.id) {
            Some(mut existing) => {
                if incoming.updated_at <= existing.updated_at {
                    debug!(driver_id = %incoming.id, "stale driver snapshot dropped");
                    return;
                }
                existing.location = incoming.location.filter(Coordinate::is_valid);
                existing.is_online = incoming.is_online;
                existing.is_available = incoming.is_available;
                existing.current_order = incoming.current_order;
                existing.updated_at = incoming.updated_at;
            }
            None => {
                self.drivers.insert(incoming.id, incoming);
            }
        }
    }

    /// Merges a full order record. Cancelled orders leave the working set.
    pub fn merge_order_snapshot(&self, incoming: Order) {
        if incoming.status == OrderStatus::Cancelled {
            self.orders.remove(&incoming.id);
            return;
        }

        match self.orders.get_mut(&incoming.id) {
            Some(mut existing) => {
                if incoming.updated_at <= existing.updated_at {
                    debug!(order_id = %incoming.id, "stale order snapshot dropped");
                    return;
                }
                existing.status = incoming.status;
                existing.driver_id = incoming.driver_id;
                existing.driver_location = incoming.driver_location.filter(Coordinate::is_valid);
                existing.updated_at = incoming.updated_at;
            }
            None => {
                self.orders.insert(incoming.id, incoming);
            }
        }
    }

    /// Applies one driver GPS update. Unknown ids are a no-op; updates older
    /// than the record are dropped regardless of arrival order.
    pub fn apply_driver_location(&self, update: DriverLocationUpdate) {
        let Some(mut driver) = self.drivers.get_mut(&update.driver_id) else {
            return;
        };

        if update.recorded_at <= driver.updated_at {
            debug!(driver_id = %update.driver_id, "stale location update dropped");
            return;
        }

        driver.location = update.location.filter(Coordinate::is_valid);
        driver.updated_at = update.recorded_at;
    }

    /// Applies one order tracking update; same staleness rule as drivers.
    pub fn apply_order_location(&self, update: OrderLocationUpdate) {
        if update.status == OrderStatus::Cancelled {
            self.orders.remove(&update.order_id);
            return;
        }

        let Some(mut order) = self.orders.get_mut(&update.order_id) else {
            return;
        };

        if update.recorded_at <= order.updated_at {
            debug!(order_id = %update.order_id, "stale order update dropped");
            return;
        }

        order.driver_location = update.driver_location.filter(Coordinate::is_valid);
        order.status = update.status;
        order.updated_at = update.recorded_at;
    }
}

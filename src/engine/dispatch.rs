use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::EarningsRates;
use crate::engine::{assignment, earnings, matrix, route};
use crate::error::DispatchError;
use crate::models::assignment::AssignmentPlan;
use crate::models::delivery::Delivery;
use crate::models::driver::Driver;
use crate::models::route::Route;
use crate::observability::metrics::Metrics;
use crate::routing::{MatrixProvider, TravelProfile};

/// One dispatch result: who got what, and the route each driver runs.
#[derive(Debug, Clone)]
pub struct DispatchPlan {
    pub assignments: AssignmentPlan,
    pub routes: Vec<Route>,
}

/// Runs the full dispatch pipeline: travel matrix, greedy assignment, route
/// per driver, earnings per route. Holds no cross-call state; every call is
/// a fresh computation over its inputs, so independent batches may run in
/// parallel.
pub struct Dispatcher<P> {
    provider: P,
    profile: TravelProfile,
    rates: EarningsRates,
    metrics: Metrics,
}

impl<P: MatrixProvider + Sync> Dispatcher<P> {
    pub fn new(provider: P, rates: EarningsRates, metrics: Metrics) -> Self {
        Self {
            provider,
            profile: TravelProfile::default(),
            rates,
            metrics,
        }
    }

    pub fn with_profile(mut self, profile: TravelProfile) -> Self {
        self.profile = profile;
        self
    }

    /// The token lets a newer recompute supersede this one: a cancelled
    /// dispatch stops at the next checkpoint and returns
    /// `DispatchError::Cancelled` without partial output.
    pub async fn dispatch(
        &self,
        drivers: &[Driver],
        deliveries: &[Delivery],
        cancel: &CancellationToken,
    ) -> Result<DispatchPlan, DispatchError> {
        let start = Instant::now();
        let result = self.run(drivers, deliveries, cancel).await;
        let elapsed = start.elapsed().as_secs_f64();

        let outcome = match &result {
            Ok(_) => "success",
            Err(DispatchError::Cancelled) => "cancelled",
            Err(_) => "error",
        };
        self.metrics
            .dispatch_latency_seconds
            .with_label_values(&[outcome])
            .observe(elapsed);
        self.metrics
            .dispatches_total
            .with_label_values(&[outcome])
            .inc();

        result
    }

    async fn run(
        &self,
        drivers: &[Driver],
        deliveries: &[Delivery],
        cancel: &CancellationToken,
    ) -> Result<DispatchPlan, DispatchError> {
        if cancel.is_cancelled() {
            return Err(DispatchError::Cancelled);
        }

        let (travel, matrix_degraded) =
            matrix::dispatch_matrix(&self.provider, drivers, deliveries, self.profile).await;
        if matrix_degraded {
            self.metrics.routing_fallbacks_total.inc();
        }

        let assignments = assignment::assign(drivers, deliveries, &travel)?;

        let mut routes = Vec::new();
        for driver in drivers {
            let run = assignments.deliveries_for(&driver.id);

            // Keep the gauge current even for drivers who got nothing this
            // round, so a load from an earlier dispatch does not linger.
            if driver.is_dispatchable() {
                self.metrics
                    .driver_load
                    .with_label_values(&[&driver.id.to_string()])
                    .set(run.len() as f64);
            }

            if run.is_empty() {
                continue;
            }
            if cancel.is_cancelled() {
                return Err(DispatchError::Cancelled);
            }

            let mut route = route::build_route(driver, run, &self.provider, self.profile).await;
            if route.degraded {
                self.metrics.routing_fallbacks_total.inc();
            }
            route.total_earnings = earnings::compute(run, route.total_distance_meters, &self.rates);

            info!(
                driver_id = %driver.id,
                deliveries = run.len(),
                distance_m = route.total_distance_meters,
                earnings = route.total_earnings,
                degraded = route.degraded,
                "route built"
            );
            routes.push(route);
        }

        self.metrics
            .deliveries_assigned_total
            .inc_by(assignments.total_deliveries() as u64);

        Ok(DispatchPlan {
            assignments,
            routes,
        })
    }
}

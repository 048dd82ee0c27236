use tracing::{debug, info};

use crate::engine::scoring::compute_score;
use crate::error::DispatchError;
use crate::models::assignment::AssignmentPlan;
use crate::models::delivery::Delivery;
use crate::models::driver::Driver;
use crate::routing::TravelMatrix;

/// Greedy single-pass assignment of deliveries to drivers.
///
/// The matrix covers drivers and deliveries in one index space: row/column
/// `i < drivers.len()` is `drivers[i]`, `drivers.len() + j` is
/// `deliveries[j]`. Deliveries are handed out in priority order (stable for
/// equal priorities); each goes to the lowest-scoring dispatchable driver at
/// that moment, so earlier picks influence later ones through the load term.
/// Not globally optimal, but one pass keeps dispatch latency flat.
pub fn assign(
    drivers: &[Driver],
    deliveries: &[Delivery],
    matrix: &TravelMatrix,
) -> Result<AssignmentPlan, DispatchError> {
    let available: Vec<(usize, &Driver)> = drivers
        .iter()
        .enumerate()
        .filter(|(_, driver)| driver.is_dispatchable())
        .collect();

    if available.is_empty() {
        return Err(DispatchError::NoAvailableDrivers);
    }

    let mut ordered: Vec<(usize, &Delivery)> = deliveries.iter().enumerate().collect();
    ordered.sort_by_key(|(_, delivery)| std::cmp::Reverse(delivery.priority.weight()));

    let mut plan = AssignmentPlan::default();

    for (delivery_idx, delivery) in ordered {
        let column = drivers.len() + delivery_idx;

        let mut best: Option<(&Driver, f64)> = None;
        for (driver_idx, driver) in available.iter().copied() {
            let score = compute_score(
                matrix.distance(driver_idx, column),
                matrix.duration(driver_idx, column),
                plan.load_of(&driver.id),
            );

            // Strict comparison keeps ties on the first driver in input order.
            if best.is_none_or(|(_, best_score)| score < best_score) {
                best = Some((driver, score));
            }
        }

        let (winner, score) = best.ok_or_else(|| {
            DispatchError::Internal("scored zero drivers for a delivery".to_string())
        })?;

        debug!(
            delivery_id = %delivery.id,
            driver_id = %winner.id,
            score,
            "delivery scored"
        );
        plan.push(winner.id, delivery.clone());
    }

    info!(
        drivers = available.len(),
        deliveries = deliveries.len(),
        "assignment complete"
    );

    Ok(plan)
}

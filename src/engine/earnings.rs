use crate::config::EarningsRates;
use crate::models::delivery::{Delivery, Priority};

const METERS_PER_MILE: f64 = 1_609.34;

/// Estimated driver earnings for one route: base pay, mileage pay over the
/// routed distance, and an expected tip per delivery.
pub fn compute(deliveries: &[Delivery], total_distance_meters: f64, rates: &EarningsRates) -> f64 {
    let mileage = total_distance_meters / METERS_PER_MILE * rates.per_mile;
    let tips: f64 = deliveries.iter().map(|d| tip_estimate(d, rates)).sum();

    rates.base_pay + mileage + tips
}

fn tip_estimate(delivery: &Delivery, rates: &EarningsRates) -> f64 {
    match delivery.priority {
        Priority::High => rates.high_priority_tip,
        Priority::Normal | Priority::Low => rates.standard_tip,
    }
}

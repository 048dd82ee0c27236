const DISTANCE_WEIGHT: f64 = 0.40;
const DURATION_WEIGHT: f64 = 0.40;
const LOAD_WEIGHT: f64 = 0.20;

/// Cost stand-in when no travel data exists for a pair, e.g. a driver with no
/// GPS fix. Large enough that any driver with real data wins, finite so the
/// load term still breaks ties among unlocated drivers.
pub const UNKNOWN_COST: f64 = 1.0e9;

/// Weighted cost of giving a delivery to a driver. Lower is better. Distance
/// is meters, duration seconds, load the number of deliveries already handed
/// to this driver within the current dispatch.
pub fn compute_score(distance_m: Option<f64>, duration_s: Option<f64>, current_load: usize) -> f64 {
    let distance = normalize(distance_m);
    let duration = normalize(duration_s);

    distance * DISTANCE_WEIGHT + duration * DURATION_WEIGHT + current_load as f64 * LOAD_WEIGHT
}

fn normalize(cost: Option<f64>) -> f64 {
    match cost {
        Some(value) if value.is_finite() => value,
        _ => UNKNOWN_COST,
    }
}

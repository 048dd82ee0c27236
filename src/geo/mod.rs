use crate::models::coordinate::Coordinate;

const EARTH_RADIUS_MILES: f64 = 3_958.8;

/// Great-circle distance in miles, rounded to two decimals. ETA math works in
/// miles because the speed model is in mph.
pub fn haversine_miles(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    round2(EARTH_RADIUS_MILES * central_angle)
}

/// Straight-line distance in meters, used when the routing backend is down
/// and dispatch needs a pseudo-matrix to keep scoring drivers.
pub fn haversine_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    const MILE_METERS: f64 = 1_609.34;
    haversine_miles(a, b) * MILE_METERS
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

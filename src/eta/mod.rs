//! Status-driven ETA model: haversine distance to the destination, a speed
//! picked from the order status, plus a distance/status buffer.

use crate::geo::haversine_miles;
use crate::models::coordinate::Coordinate;
use crate::models::order::{Order, OrderStatus};

const MIN_ETA_MINUTES: u32 = 8;
const BASE_BUFFER_MINUTES: u32 = 10;
const EN_ROUTE_BUFFER_MINUTES: u32 = 5;

/// Distance in miles between two points, rounded to two decimals.
pub fn distance_miles(a: &Coordinate, b: &Coordinate) -> f64 {
    haversine_miles(a, b)
}

/// Assumed travel speed in mph for an active order. Terminal statuses have no
/// speed; the order is no longer moving.
pub fn speed_for_status(status: OrderStatus) -> Option<f64> {
    match status {
        OrderStatus::Delivered | OrderStatus::Cancelled => None,
        OrderStatus::PickedUp | OrderStatus::InTransit => Some(30.0),
        OrderStatus::Accepted => Some(25.0),
        OrderStatus::Assigned => Some(20.0),
        _ => Some(15.0),
    }
}

/// ETA in minutes for the given remaining distance. Never below 8 minutes for
/// an active order; 0 for terminal statuses regardless of distance.
pub fn eta_minutes(distance_miles: f64, status: OrderStatus) -> u32 {
    let Some(speed) = speed_for_status(status) else {
        return 0;
    };

    let raw = (distance_miles / speed * 60.0).round() as u32;

    let mut buffer = if distance_miles > 10.0 {
        20
    } else if distance_miles > 5.0 {
        15
    } else {
        BASE_BUFFER_MINUTES
    };
    if status.is_en_route() {
        buffer += EN_ROUTE_BUFFER_MINUTES;
    }

    (raw + buffer).max(MIN_ETA_MINUTES)
}

/// Fixed ETA window shown when no driver location is known yet.
pub fn fallback_eta_range(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending | OrderStatus::Confirmed => "45-60 min",
        OrderStatus::Preparing => "30-45 min",
        OrderStatus::Ready => "20-35 min",
        OrderStatus::Assigned => "15-25 min",
        OrderStatus::Accepted => "10-20 min",
        OrderStatus::PickedUp | OrderStatus::InTransit => "8-15 min",
        OrderStatus::Delivered => "Delivered",
        OrderStatus::Cancelled => "Cancelled",
    }
}

pub fn format_minutes(minutes: i64) -> String {
    if minutes <= 0 {
        return "Delivered".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} min");
    }

    let hours = minutes / 60;
    let rest = minutes % 60;
    if rest == 0 {
        format!("{hours}h")
    } else {
        format!("{hours}h {rest}m")
    }
}

/// Display ETA for an order: live estimate when the driver position is known,
/// otherwise the status-based fallback window.
pub fn order_eta_text(order: &Order) -> String {
    if order.status == OrderStatus::Cancelled {
        return fallback_eta_range(order.status).to_string();
    }

    match order.driver_location.filter(Coordinate::is_valid) {
        Some(driver_at) => {
            let miles = distance_miles(&driver_at, &order.destination);
            format_minutes(eta_minutes(miles, order.status) as i64)
        }
        None => fallback_eta_range(order.status).to_string(),
    }
}

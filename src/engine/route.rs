use tracing::warn;

use crate::models::coordinate::Coordinate;
use crate::models::delivery::Delivery;
use crate::models::driver::Driver;
use crate::models::route::{LegKind, Route, RouteLeg};
use crate::routing::{MatrixProvider, RoutePath, TravelProfile};

const FALLBACK_DISTANCE_METERS: f64 = 5_000.0;
const FALLBACK_TIME_SECONDS: f64 = 600.0;

/// Builds the route a driver runs for their assigned deliveries: pickup at
/// the driver's position, then each delivery in assignment order.
///
/// Never fails. Unusable coordinates are dropped, and when fewer than two
/// stops remain or the routing backend cannot produce a path, a default
/// route is substituted so the assignment still goes out. `degraded` marks
/// the substitution.
pub async fn build_route<P: MatrixProvider>(
    driver: &Driver,
    deliveries: &[Delivery],
    provider: &P,
    profile: TravelProfile,
) -> Route {
    let mut stops: Vec<Coordinate> = Vec::with_capacity(deliveries.len() + 1);
    let mut kept: Vec<&Delivery> = Vec::with_capacity(deliveries.len());

    match driver.known_location() {
        Some(start) => stops.push(start),
        None => warn!(driver_id = %driver.id, "driver has no usable location"),
    }

    for delivery in deliveries {
        if delivery.location.is_valid() {
            stops.push(delivery.location);
            kept.push(delivery);
        } else {
            warn!(
                delivery_id = %delivery.id,
                "dropping delivery coordinate from route"
            );
        }
    }

    // A route needs the driver start plus at least one delivery stop.
    if stops.len() < 2 || stops.len() != kept.len() + 1 {
        return fallback_route(driver);
    }

    let path = match provider.route(&stops, profile).await {
        Ok(path) => path,
        Err(err) => {
            warn!(driver_id = %driver.id, error = %err, "route request failed");
            return fallback_route(driver);
        }
    };

    let mut legs = Vec::with_capacity(kept.len() + 1);
    // The pickup leg shows the time to the first stop, so it deliberately
    // repeats the first delivery leg's duration. Summing delivery legs alone
    // gives the route total.
    legs.push(RouteLeg {
        location: Some(stops[0]),
        kind: LegKind::Pickup,
        order_id: None,
        address: "Driver Location".to_string(),
        eta_seconds: leg_duration(&path, 0),
    });

    for (idx, delivery) in kept.iter().enumerate() {
        legs.push(RouteLeg {
            location: Some(delivery.location),
            kind: LegKind::Delivery,
            order_id: Some(delivery.id),
            address: delivery.address.clone(),
            eta_seconds: leg_duration(&path, idx),
        });
    }

    Route {
        driver_id: driver.id,
        driver_name: driver.name.clone(),
        legs,
        total_distance_meters: path.total_distance,
        total_time_seconds: path.total_duration,
        total_earnings: 0.0,
        degraded: false,
    }
}

/// Travel time of the path leg arriving at stop `stop + 1`. Backends that
/// return a short leg list are tolerated rather than rejected.
fn leg_duration(path: &RoutePath, stop: usize) -> f64 {
    path.leg_durations.get(stop).copied().unwrap_or(0.0)
}

fn fallback_route(driver: &Driver) -> Route {
    Route {
        driver_id: driver.id,
        driver_name: driver.name.clone(),
        legs: vec![RouteLeg {
            location: driver.known_location(),
            kind: LegKind::Delivery,
            order_id: None,
            address: "Estimated route".to_string(),
            eta_seconds: FALLBACK_TIME_SECONDS,
        }],
        total_distance_meters: FALLBACK_DISTANCE_METERS,
        total_time_seconds: FALLBACK_TIME_SECONDS,
        total_earnings: 0.0,
        degraded: true,
    }
}

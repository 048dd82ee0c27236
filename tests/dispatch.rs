use chrono::Utc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use dispatch_core::config::EarningsRates;
use dispatch_core::engine::dispatch::Dispatcher;
use dispatch_core::error::DispatchError;
use dispatch_core::models::coordinate::Coordinate;
use dispatch_core::models::delivery::{Delivery, Priority};
use dispatch_core::models::driver::Driver;
use dispatch_core::models::route::LegKind;
use dispatch_core::observability::metrics::Metrics;
use dispatch_core::routing::{
    MatrixProvider, RoutePath, RoutingError, TravelMatrix, TravelProfile,
};

/// Backend stub: straight-line style costs at a fixed speed, flat per-pair
/// values so tests stay deterministic.
struct StubProvider {
    healthy: bool,
}

impl MatrixProvider for StubProvider {
    async fn table(
        &self,
        coords: &[Coordinate],
        _profile: TravelProfile,
    ) -> Result<TravelMatrix, RoutingError> {
        if !self.healthy {
            return Err(RoutingError::EmptyResponse);
        }

        let n = coords.len();
        let mut distances = vec![vec![0.0; n]; n];
        let mut durations = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    // Cost scales with how far apart the points sit in the
                    // input, which is enough to make scoring deterministic.
                    let gap = i.abs_diff(j) as f64;
                    distances[i][j] = 1_000.0 * gap;
                    durations[i][j] = 120.0 * gap;
                }
            }
        }
        Ok(TravelMatrix {
            distances,
            durations,
        })
    }

    async fn route(
        &self,
        coords: &[Coordinate],
        _profile: TravelProfile,
    ) -> Result<RoutePath, RoutingError> {
        if !self.healthy {
            return Err(RoutingError::EmptyResponse);
        }

        let legs = coords.len().saturating_sub(1);
        Ok(RoutePath {
            leg_distances: vec![1_609.34; legs],
            leg_durations: vec![300.0; legs],
            total_distance: 1_609.34 * legs as f64,
            total_duration: 300.0 * legs as f64,
        })
    }
}

fn driver(seed: u128, lat: f64, lng: f64) -> Driver {
    Driver {
        id: Uuid::from_u128(seed),
        name: format!("driver-{seed}"),
        location: Some(Coordinate::new(lat, lng)),
        is_online: true,
        is_available: true,
        current_order: None,
        updated_at: Utc::now(),
    }
}

fn delivery(seed: u128, priority: Priority, lat: f64, lng: f64) -> Delivery {
    Delivery {
        id: Uuid::from_u128(seed),
        address: format!("{seed} E 6th St"),
        location: Coordinate::new(lat, lng),
        priority,
        estimated_minutes: None,
    }
}

fn dispatcher(healthy: bool) -> Dispatcher<StubProvider> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .try_init();

    Dispatcher::new(
        StubProvider { healthy },
        EarningsRates::default(),
        Metrics::new(),
    )
}

#[tokio::test]
async fn dispatch_covers_every_delivery_exactly_once() {
    let drivers = vec![
        driver(1, 30.2672, -97.7431),
        driver(2, 30.2500, -97.7500),
    ];
    let deliveries = vec![
        delivery(10, Priority::High, 30.2849, -97.7341),
        delivery(11, Priority::Normal, 30.2900, -97.7300),
        delivery(12, Priority::Low, 30.2950, -97.7250),
    ];

    let plan = dispatcher(true)
        .dispatch(&drivers, &deliveries, &CancellationToken::new())
        .await
        .unwrap();

    let mut assigned: Vec<Uuid> = plan
        .assignments
        .by_driver
        .values()
        .flatten()
        .map(|d| d.id)
        .collect();
    assigned.sort();

    let mut expected: Vec<Uuid> = deliveries.iter().map(|d| d.id).collect();
    expected.sort();

    assert_eq!(assigned, expected);
}

#[tokio::test]
async fn dispatch_without_available_drivers_fails_cleanly() {
    let mut d = driver(1, 30.2672, -97.7431);
    d.is_available = false;
    let deliveries = vec![delivery(10, Priority::Normal, 30.2849, -97.7341)];

    let err = dispatcher(true)
        .dispatch(&[d], &deliveries, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::NoAvailableDrivers));
}

#[tokio::test]
async fn routes_carry_legs_and_earnings() {
    let drivers = vec![driver(1, 30.2672, -97.7431)];
    let deliveries = vec![
        delivery(10, Priority::High, 30.2849, -97.7341),
        delivery(11, Priority::Normal, 30.2900, -97.7300),
    ];

    let plan = dispatcher(true)
        .dispatch(&drivers, &deliveries, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(plan.routes.len(), 1);
    let route = &plan.routes[0];

    assert!(!route.degraded);
    assert_eq!(route.legs.len(), deliveries.len() + 1);
    assert_eq!(route.legs[0].kind, LegKind::Pickup);
    assert!(route
        .legs
        .iter()
        .skip(1)
        .all(|leg| leg.kind == LegKind::Delivery));

    // 2 legs of one mile each: 2.00 base + 2 * 0.70 mileage + 3 + 1 tips.
    assert!((route.total_earnings - 7.40).abs() < 1e-6);
}

#[tokio::test]
async fn backend_outage_degrades_instead_of_failing() {
    let drivers = vec![driver(1, 30.2672, -97.7431)];
    let deliveries = vec![delivery(10, Priority::Normal, 30.2849, -97.7341)];

    let plan = dispatcher(false)
        .dispatch(&drivers, &deliveries, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(plan.assignments.total_deliveries(), 1);
    assert_eq!(plan.routes.len(), 1);

    let route = &plan.routes[0];
    assert!(route.degraded);
    assert_eq!(route.total_distance_meters, 5_000.0);
    assert_eq!(route.total_time_seconds, 600.0);
    assert_eq!(route.legs.len(), 1);
}

#[tokio::test]
async fn cancelled_token_supersedes_a_dispatch() {
    let drivers = vec![driver(1, 30.2672, -97.7431)];
    let deliveries = vec![delivery(10, Priority::Normal, 30.2849, -97.7341)];

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = dispatcher(true)
        .dispatch(&drivers, &deliveries, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Cancelled));
}

#[tokio::test]
async fn high_priority_rides_first_on_a_shared_route() {
    let drivers = vec![driver(1, 30.2672, -97.7431)];
    let deliveries = vec![
        delivery(10, Priority::Low, 30.2849, -97.7341),
        delivery(11, Priority::High, 30.2900, -97.7300),
    ];

    let plan = dispatcher(true)
        .dispatch(&drivers, &deliveries, &CancellationToken::new())
        .await
        .unwrap();

    let run = plan.assignments.deliveries_for(&drivers[0].id);
    assert_eq!(run[0].id, Uuid::from_u128(11));
    assert_eq!(run[1].id, Uuid::from_u128(10));

    // Route legs follow the same order.
    let route = &plan.routes[0];
    assert_eq!(route.legs[1].order_id, Some(Uuid::from_u128(11)));
    assert_eq!(route.legs[2].order_id, Some(Uuid::from_u128(10)));
}

#[tokio::test]
async fn driver_load_gauge_resets_when_a_driver_gets_nothing() {
    let metrics = Metrics::new();
    let engine = Dispatcher::new(
        StubProvider { healthy: true },
        EarningsRates::default(),
        metrics.clone(),
    );

    let drivers = vec![driver(1, 30.2672, -97.7431)];
    let deliveries = vec![delivery(10, Priority::Normal, 30.2849, -97.7341)];
    let label = drivers[0].id.to_string();

    engine
        .dispatch(&drivers, &deliveries, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(
        metrics.driver_load.with_label_values(&[&label]).get(),
        1.0
    );

    // Next dispatch has no work for this driver; the gauge must not keep
    // reporting the old load.
    engine
        .dispatch(&drivers, &[], &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(
        metrics.driver_load.with_label_values(&[&label]).get(),
        0.0
    );
}

#[tokio::test]
async fn metrics_track_dispatch_outcomes() {
    let metrics = Metrics::new();
    let engine = Dispatcher::new(
        StubProvider { healthy: true },
        EarningsRates::default(),
        metrics.clone(),
    );

    let drivers = vec![driver(1, 30.2672, -97.7431)];
    let deliveries = vec![delivery(10, Priority::Normal, 30.2849, -97.7341)];

    engine
        .dispatch(&drivers, &deliveries, &CancellationToken::new())
        .await
        .unwrap();

    let exposition = metrics.encode().unwrap();
    assert!(exposition.contains("dispatches_total"));
    assert!(exposition.contains("deliveries_assigned_total"));
}

use tracing::warn;

use crate::geo::haversine_meters;
use crate::models::coordinate::Coordinate;
use crate::models::delivery::Delivery;
use crate::models::driver::Driver;
use crate::routing::{MatrixProvider, TravelMatrix, TravelProfile};

/// Assumed average road speed when durations have to be derived from
/// straight-line distance, roughly 30 mph.
const FALLBACK_SPEED_MPS: f64 = 13.4;

/// Travel matrix over drivers then deliveries, in one index space: row/column
/// `i < drivers.len()` is `drivers[i]`, `drivers.len() + j` is
/// `deliveries[j]`. Pairs involving an unlocated point cost infinity.
///
/// Fail-open: when the backend errors or too few points have a usable fix,
/// the matrix degrades to haversine distances with derived durations so
/// dispatch keeps running. The flag reports which kind was produced.
pub async fn dispatch_matrix<P: MatrixProvider>(
    provider: &P,
    drivers: &[Driver],
    deliveries: &[Delivery],
    profile: TravelProfile,
) -> (TravelMatrix, bool) {
    let points: Vec<Option<Coordinate>> = drivers
        .iter()
        .map(Driver::known_location)
        .chain(deliveries.iter().map(|d| {
            let coord = d.location;
            coord.is_valid().then_some(coord)
        }))
        .collect();

    let located: Vec<(usize, Coordinate)> = points
        .iter()
        .enumerate()
        .filter_map(|(idx, point)| point.map(|c| (idx, c)))
        .collect();

    if located.len() >= 2 {
        let coords: Vec<Coordinate> = located.iter().map(|(_, c)| *c).collect();
        match provider.table(&coords, profile).await {
            Ok(table) => return (expand(&points, &located, table), false),
            Err(err) => {
                warn!(error = %err, "matrix request failed; falling back to haversine");
            }
        }
    } else {
        warn!(
            located = located.len(),
            points = points.len(),
            "too few located points for a matrix request"
        );
    }

    (haversine_matrix(&points), true)
}

/// Spreads a matrix over the located subset back onto the full point list.
fn expand(
    points: &[Option<Coordinate>],
    located: &[(usize, Coordinate)],
    table: TravelMatrix,
) -> TravelMatrix {
    let n = points.len();
    let mut distances = vec![vec![f64::INFINITY; n]; n];
    let mut durations = vec![vec![f64::INFINITY; n]; n];

    for i in 0..n {
        distances[i][i] = 0.0;
        durations[i][i] = 0.0;
    }

    for (sub_i, (full_i, _)) in located.iter().enumerate() {
        for (sub_j, (full_j, _)) in located.iter().enumerate() {
            if let Some(d) = table.distance(sub_i, sub_j) {
                distances[*full_i][*full_j] = d;
            }
            if let Some(t) = table.duration(sub_i, sub_j) {
                durations[*full_i][*full_j] = t;
            }
        }
    }

    TravelMatrix {
        distances,
        durations,
    }
}

fn haversine_matrix(points: &[Option<Coordinate>]) -> TravelMatrix {
    let n = points.len();
    let mut distances = vec![vec![f64::INFINITY; n]; n];
    let mut durations = vec![vec![f64::INFINITY; n]; n];

    for i in 0..n {
        for j in 0..n {
            if i == j {
                distances[i][j] = 0.0;
                durations[i][j] = 0.0;
                continue;
            }
            if let (Some(a), Some(b)) = (points[i], points[j]) {
                let meters = haversine_meters(&a, &b);
                distances[i][j] = meters;
                durations[i][j] = meters / FALLBACK_SPEED_MPS;
            }
        }
    }

    TravelMatrix {
        distances,
        durations,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::dispatch_matrix;
    use crate::models::coordinate::Coordinate;
    use crate::models::delivery::{Delivery, Priority};
    use crate::models::driver::Driver;
    use crate::routing::{MatrixProvider, RoutePath, RoutingError, TravelMatrix, TravelProfile};

    struct FailingProvider;

    impl MatrixProvider for FailingProvider {
        async fn table(
            &self,
            _coords: &[Coordinate],
            _profile: TravelProfile,
        ) -> Result<TravelMatrix, RoutingError> {
            Err(RoutingError::EmptyResponse)
        }

        async fn route(
            &self,
            _coords: &[Coordinate],
            _profile: TravelProfile,
        ) -> Result<RoutePath, RoutingError> {
            Err(RoutingError::EmptyResponse)
        }
    }

    fn driver(location: Option<Coordinate>) -> Driver {
        Driver {
            id: Uuid::new_v4(),
            name: "matrix-driver".to_string(),
            location,
            is_online: true,
            is_available: true,
            current_order: None,
            updated_at: Utc::now(),
        }
    }

    fn delivery(lat: f64, lng: f64) -> Delivery {
        Delivery {
            id: Uuid::new_v4(),
            address: "somewhere".to_string(),
            location: Coordinate::new(lat, lng),
            priority: Priority::Normal,
            estimated_minutes: None,
        }
    }

    #[tokio::test]
    async fn backend_failure_degrades_to_haversine() {
        let drivers = vec![driver(Some(Coordinate::new(30.2672, -97.7431)))];
        let deliveries = vec![delivery(30.2849, -97.7341)];

        let (matrix, degraded) = dispatch_matrix(
            &FailingProvider,
            &drivers,
            &deliveries,
            TravelProfile::Driving,
        )
        .await;

        assert!(degraded);
        let meters = matrix.distance(0, 1).unwrap();
        // Straight-line distance for this pair is about 2.15 km.
        assert!((meters - 2_150.0).abs() < 100.0);
        let seconds = matrix.duration(0, 1).unwrap();
        assert!((seconds - meters / 13.4).abs() < 1e-9);
    }

    #[tokio::test]
    async fn unlocated_driver_rows_are_infinite() {
        let drivers = vec![
            driver(None),
            driver(Some(Coordinate::new(30.2672, -97.7431))),
        ];
        let deliveries = vec![delivery(30.2849, -97.7341)];

        let (matrix, _) = dispatch_matrix(
            &FailingProvider,
            &drivers,
            &deliveries,
            TravelProfile::Driving,
        )
        .await;

        assert!(matrix.distance(0, 2).unwrap().is_infinite());
        assert!(matrix.distance(1, 2).unwrap().is_finite());
        assert_eq!(matrix.distance(0, 0), Some(0.0));
    }
}

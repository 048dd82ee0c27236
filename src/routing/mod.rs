pub mod osrm;

use thiserror::Error;

use crate::models::coordinate::Coordinate;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("routing backend http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("routing backend returned unusable payload: {0}")]
    Decode(String),

    #[error("routing backend rejected request: {code}: {message}")]
    Backend { code: String, message: String },

    #[error("routing backend returned no routes")]
    EmptyResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TravelProfile {
    #[default]
    Driving,
    Cycling,
    Walking,
}

impl TravelProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelProfile::Driving => "driving",
            TravelProfile::Cycling => "cycling",
            TravelProfile::Walking => "walking",
        }
    }
}

/// Pairwise travel costs for an ordered coordinate list. `distances[i][j]` is
/// meters from point i to point j, `durations[i][j]` seconds.
#[derive(Debug, Clone)]
pub struct TravelMatrix {
    pub distances: Vec<Vec<f64>>,
    pub durations: Vec<Vec<f64>>,
}

impl TravelMatrix {
    pub fn distance(&self, from: usize, to: usize) -> Option<f64> {
        self.distances.get(from)?.get(to).copied()
    }

    pub fn duration(&self, from: usize, to: usize) -> Option<f64> {
        self.durations.get(from)?.get(to).copied()
    }
}

/// A single path through an ordered stop sequence, one leg per consecutive
/// pair of stops.
#[derive(Debug, Clone)]
pub struct RoutePath {
    pub leg_distances: Vec<f64>,
    pub leg_durations: Vec<f64>,
    pub total_distance: f64,
    pub total_duration: f64,
}

/// Seam over the external Matrix/Directions backend. One network attempt per
/// call; callers decide the fallback policy on error.
pub trait MatrixProvider {
    fn table(
        &self,
        coords: &[Coordinate],
        profile: TravelProfile,
    ) -> impl Future<Output = Result<TravelMatrix, RoutingError>> + Send;

    fn route(
        &self,
        coords: &[Coordinate],
        profile: TravelProfile,
    ) -> impl Future<Output = Result<RoutePath, RoutingError>> + Send;
}

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::models::coordinate::Coordinate;
use crate::routing::{MatrixProvider, RoutePath, RoutingError, TravelMatrix, TravelProfile};

/// Thin HTTP client for an OSRM-compatible routing backend.
#[derive(Debug, Clone)]
pub struct OsrmMatrixProvider {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct TableResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    distances: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    durations: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    distance: f64,
    duration: f64,
}

impl OsrmMatrixProvider {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, RoutingError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(
        &self,
        service: &str,
        coords: &[Coordinate],
        profile: TravelProfile,
    ) -> Result<Url, RoutingError> {
        // OSRM wants lng,lat pairs joined by ';'.
        let segment = coords
            .iter()
            .map(|c| format!("{:.6},{:.6}", c.lng, c.lat))
            .collect::<Vec<_>>()
            .join(";");

        let base = format!("{}/{service}/v1/{}/{segment}", self.endpoint, profile.as_str());
        Url::parse(&base).map_err(|err| RoutingError::Decode(format!("bad url: {err}")))
    }

    fn backend_error(code: String, message: Option<String>) -> RoutingError {
        RoutingError::Backend {
            code,
            message: message.unwrap_or_else(|| "no message".to_string()),
        }
    }
}

impl MatrixProvider for OsrmMatrixProvider {
    async fn table(
        &self,
        coords: &[Coordinate],
        profile: TravelProfile,
    ) -> Result<TravelMatrix, RoutingError> {
        let mut url = self.url("table", coords, profile)?;
        url.query_pairs_mut()
            .append_pair("annotations", "distance,duration");

        debug!(points = coords.len(), %url, "requesting travel matrix");
        let response = self.client.get(url).send().await?;
        let parsed: TableResponse = response.json().await?;

        if parsed.code != "Ok" {
            return Err(Self::backend_error(parsed.code, parsed.message));
        }

        let distances = parsed
            .distances
            .ok_or_else(|| RoutingError::Decode("table response missing distances".to_string()))?;
        let durations = parsed
            .durations
            .ok_or_else(|| RoutingError::Decode("table response missing durations".to_string()))?;

        if distances.len() != coords.len() || durations.len() != coords.len() {
            return Err(RoutingError::Decode(format!(
                "expected {}x{} matrix, got {}x{}",
                coords.len(),
                coords.len(),
                distances.len(),
                durations.len()
            )));
        }

        Ok(TravelMatrix {
            distances,
            durations,
        })
    }

    async fn route(
        &self,
        coords: &[Coordinate],
        profile: TravelProfile,
    ) -> Result<RoutePath, RoutingError> {
        let mut url = self.url("route", coords, profile)?;
        url.query_pairs_mut().append_pair("overview", "false");

        debug!(stops = coords.len(), %url, "requesting route");
        let response = self.client.get(url).send().await?;
        let parsed: RouteResponse = response.json().await?;

        if parsed.code != "Ok" {
            return Err(Self::backend_error(parsed.code, parsed.message));
        }

        let route = parsed.routes.into_iter().next().ok_or(RoutingError::EmptyResponse)?;

        Ok(RoutePath {
            leg_distances: route.legs.iter().map(|leg| leg.distance).collect(),
            leg_durations: route.legs.iter().map(|leg| leg.duration).collect(),
            total_distance: route.distance,
            total_duration: route.duration,
        })
    }
}

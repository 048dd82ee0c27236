use std::env;
use std::time::Duration;

use crate::error::DispatchError;

/// Pay model for driver earnings. Defaults match the live pay sheet: $2.00
/// base, $0.70 per mile, $3.00 expected tip on high-priority orders, $1.00
/// otherwise.
#[derive(Debug, Clone, Copy)]
pub struct EarningsRates {
    pub base_pay: f64,
    pub per_mile: f64,
    pub high_priority_tip: f64,
    pub standard_tip: f64,
}

impl Default for EarningsRates {
    fn default() -> Self {
        Self {
            base_pay: 2.00,
            per_mile: 0.70,
            high_priority_tip: 3.00,
            standard_tip: 1.00,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub routing_url: String,
    pub routing_timeout: Duration,
    pub full_refresh: Duration,
    pub location_refresh: Duration,
    pub log_level: String,
    pub rates: EarningsRates,
}

impl Config {
    pub fn from_env() -> Result<Self, DispatchError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            routing_url: env::var("ROUTING_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            routing_timeout: Duration::from_millis(parse_or_default("ROUTING_TIMEOUT_MS", 3000)?),
            full_refresh: Duration::from_secs(parse_or_default("FULL_REFRESH_SECS", 30)?),
            location_refresh: Duration::from_secs(parse_or_default("LOCATION_REFRESH_SECS", 5)?),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            rates: EarningsRates {
                base_pay: parse_or_default("BASE_PAY", 2.00)?,
                per_mile: parse_or_default("PER_MILE_PAY", 0.70)?,
                ..EarningsRates::default()
            },
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, DispatchError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| DispatchError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

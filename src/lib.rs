//! Dispatch optimization and real-time ETA core for a delivery fleet.
//!
//! The presentation layer hands in driver and delivery records, gets back an
//! assignment plan with per-driver routes and earnings, and asks the `eta`
//! module for display strings. Routing data comes from an external
//! OSRM-compatible backend behind the [`routing::MatrixProvider`] seam;
//! when it is unavailable, dispatch degrades to defaults instead of failing.

pub mod config;
pub mod engine;
pub mod error;
pub mod eta;
pub mod geo;
pub mod models;
pub mod observability;
pub mod reconcile;
pub mod routing;

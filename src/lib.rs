//! fleetwatch - liveness dashboard for a small fleet of machines
//!
//! This library provides the probe engine, the concurrent aggregator and
//! diagnosis rules behind the dashboard, plus the session and approval flow
//! that gates it.

pub mod aggregator;
pub mod api;
pub mod approval;
pub mod cli;
pub mod config;
pub mod diagnosis;
pub mod feed;
pub mod fleet;
pub mod logging;
pub mod metrics;
pub mod probe;
pub mod session;

//! dashsrv - environmental sensor dashboard service
//!
//! Queries relational stores of temperature/humidity readings over a
//! user-selected date range and serves a multi-panel time-series
//! dashboard with a sunrise/sunset banner.

pub mod api;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod sun;

pub use error::{DashSrvError, Result};

/// Service information
pub const SERVICE_NAME: &str = "dashsrv";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

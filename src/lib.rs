//! Derived metrics, alerting and filtered views over tagged support
//! interactions.

pub mod aggregate;
pub mod alerts;
pub mod config;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod logging;
pub mod mock;
pub mod models;
pub mod narrative;
pub mod processing;
pub mod report;
pub mod sentiment;

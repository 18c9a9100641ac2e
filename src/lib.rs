//! Batch pipeline for delimited environmental sensor readings.
//!
//! Raw text flows through validation and normalization into a storage
//! collaborator, is read back as per-day aggregates, and feeds two domain
//! analyses: a mold-growth risk index and meteorological season-transition
//! detection.

pub mod aggregate;
pub mod config;
pub mod db;
pub mod errors;
pub mod ingest;
pub mod metrics;
pub mod models;
pub mod mold;
pub mod normalize;
pub mod parser;
pub mod report;
pub mod season;
pub mod store;

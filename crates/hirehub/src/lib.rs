//! Search and analytics core for the recruiting platform: multi-entity search with
//! relevance ranking, and time-bucketed dashboard analytics over a read-only store.

pub mod analytics;
pub mod config;
pub mod envelope;
pub mod error;
pub mod search;
pub mod storage;
pub mod telemetry;

//! Cost-governance core for cloud resource inventories: tag-completeness
//! scoring, filtering, aggregate metrics, tag remediation merging, and
//! round-trip-safe CSV export.

pub mod dataset;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod remediation;
pub mod schema;

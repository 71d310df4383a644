//! Client-side aggregation for the dashboards.
//!
//! Everything here is pure and synchronous; it consumes records already
//! fetched by the API layer.

pub mod aggregator;
pub mod reviews;

pub use aggregator::*;
pub use reviews::*;

//! Fetch layer for dashboard data.

pub mod client;

pub use client::{ApiClient, ApiError, DataSource};

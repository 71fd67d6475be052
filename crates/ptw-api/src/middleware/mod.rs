//! # Middleware Stack
//!
//! Tower middleware for the API layer:
//! - [`metrics`]: Prometheus request counters and latency histograms.
//!
//! Authentication lives in [`crate::auth`].

pub mod metrics;

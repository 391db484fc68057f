//! Metrics and observability module
//!
//! Provides Prometheus-compatible metrics for monitoring the relay.
//!
//! Key metrics exposed:
//! - Messages submitted and frames rejected
//! - Delivery outcomes per channel
//! - Live connections and pending routed resolutions

pub mod exporter;
pub mod recorder;

pub use exporter::{install_recorder, metrics_route, render_metrics, start_metrics_server, MetricsError};
pub use recorder::{init_metrics, ResolutionTimer};

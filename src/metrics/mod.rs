//! Prometheus metrics for the rendering pipeline.
//!
//! This module provides metrics for monitoring template rendering:
//! - Render outcomes and latency
//! - Template builds by cache policy
//! - Template cache hits and size

mod helpers;

pub use helpers::{encode_metrics, RenderMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "page_renderer";

lazy_static! {
    // ============================================================================
    // Render Metrics
    // ============================================================================

    /// Total render calls by outcome (ok, not_found, syntax, execution, ...)
    pub static ref RENDERS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_renders_total", METRIC_PREFIX),
        "Total render calls by outcome",
        &["outcome"]
    ).unwrap();

    /// Render latency, from lookup to the final write
    pub static ref RENDER_DURATION: Histogram = register_histogram!(
        format!("{}_render_duration_seconds", METRIC_PREFIX),
        "Render duration in seconds",
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    ).unwrap();

    // ============================================================================
    // Template Cache Metrics
    // ============================================================================

    /// Templates compiled from source, by the policy in effect
    pub static ref TEMPLATE_BUILDS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_template_builds_total", METRIC_PREFIX),
        "Total templates compiled from source",
        &["policy"]
    ).unwrap();

    /// Lookups served from the template store without a build
    pub static ref TEMPLATE_CACHE_HITS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_template_cache_hits_total", METRIC_PREFIX),
        "Total template lookups served from the store"
    ).unwrap();

    /// Compiled templates currently held in the store
    pub static ref TEMPLATES_CACHED: IntGauge = register_int_gauge!(
        format!("{}_templates_cached", METRIC_PREFIX),
        "Number of compiled templates in the store"
    ).unwrap();
}

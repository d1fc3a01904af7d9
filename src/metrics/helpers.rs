//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use crate::template::{CachePolicy, TemplateStore};

use super::{
    RENDERS_TOTAL, RENDER_DURATION, TEMPLATES_CACHED, TEMPLATE_BUILDS_TOTAL,
    TEMPLATE_CACHE_HITS_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording render metrics
pub struct RenderMetrics;

impl RenderMetrics {
    /// Record a finished render call
    pub fn record_render(outcome: &str, elapsed: Duration) {
        RENDERS_TOTAL.with_label_values(&[outcome]).inc();
        RENDER_DURATION.observe(elapsed.as_secs_f64());
    }

    /// Record a template compiled from source
    pub fn record_build(policy: CachePolicy) {
        TEMPLATE_BUILDS_TOTAL
            .with_label_values(&[policy.as_str()])
            .inc();
    }

    /// Record a lookup served from the store
    pub fn record_cache_hit() {
        TEMPLATE_CACHE_HITS_TOTAL.inc();
    }

    /// Sync the cached-template gauge with the store's live entries
    pub fn observe_store(store: &TemplateStore) {
        TEMPLATES_CACHED.set(store.len() as i64);
    }

    /// Refresh store-derived gauges, then encode everything for a scrape
    pub fn scrape(store: &TemplateStore) -> Result<String, prometheus::Error> {
        Self::observe_store(store);
        encode_metrics()
    }
}

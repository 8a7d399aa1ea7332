//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `che_exposure_reconciliations_total` - Endpoint exposure calls by exposure mode
//! - `che_exposure_sync_outcomes_total` - Object sync results by object kind and outcome
//! - `che_exposure_cleanup_errors_total` - Failed (swallowed) deletions of stale objects
//! - `che_exposure_reconciliation_duration_seconds` - Duration of full exposure passes
//! - `che_exposure_endpoints_exposed` - Endpoints whose address was ready in the last pass

use anyhow::Result;
use prometheus::{Histogram, IntCounterVec, IntGauge, Registry};
use std::sync::LazyLock;

// Metrics
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "che_exposure_reconciliations_total",
            "Total number of endpoint exposure calls by exposure mode",
        ),
        &["mode"],
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static SYNC_OUTCOMES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "che_exposure_sync_outcomes_total",
            "Total number of object sync results by object kind and outcome",
        ),
        &["kind", "outcome"],
    )
    .expect("Failed to create SYNC_OUTCOMES_TOTAL metric - this should never happen")
});

static CLEANUP_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "che_exposure_cleanup_errors_total",
            "Total number of failed deletions of objects of an inactive exposure mechanism",
        ),
        &["kind"],
    )
    .expect("Failed to create CLEANUP_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "che_exposure_reconciliation_duration_seconds",
            "Duration of a full exposure pass in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static ENDPOINTS_EXPOSED: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "che_exposure_endpoints_exposed",
        "Number of endpoints whose address was ready in the last pass",
    )
    .expect("Failed to create ENDPOINTS_EXPOSED metric - this should never happen")
});

#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SYNC_OUTCOMES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CLEANUP_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(ENDPOINTS_EXPOSED.clone()))?;

    Ok(())
}

pub fn increment_reconciliations(mode: &str) {
    RECONCILIATIONS_TOTAL.with_label_values(&[mode]).inc();
}

/// Record the outcome of one object sync (`ready`, `pending` or `failed`)
pub fn record_sync_outcome(kind: &str, outcome: &str) {
    SYNC_OUTCOMES_TOTAL.with_label_values(&[kind, outcome]).inc();
}

pub fn increment_cleanup_errors(kind: &str) {
    CLEANUP_ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

pub fn set_endpoints_exposed(count: usize) {
    ENDPOINTS_EXPOSED.set(i64::try_from(count).unwrap_or(i64::MAX));
}

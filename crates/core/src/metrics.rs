//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Ingestion (live messages, backfill runs, extraction fallbacks)
//! - Search requests
//! - User activity recording

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts};

// =============================================================================
// Ingestion Metrics
// =============================================================================

/// Channel messages processed by outcome.
pub static INGEST_MESSAGES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "filmzi_ingest_messages_total",
            "Total channel messages processed",
        ),
        &["outcome"], // "stored", "rejected", "dropped"
    )
    .unwrap()
});

/// Captions that did not match any known layout.
pub static EXTRACTION_FALLBACKS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "filmzi_extraction_fallbacks_total",
        "Total captions parsed with field-by-field fallback",
    )
    .unwrap()
});

/// Backfill runs by result.
pub static BACKFILL_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("filmzi_backfill_runs_total", "Total backfill runs"),
        &["result"], // "completed", "partial"
    )
    .unwrap()
});

// =============================================================================
// Search Metrics
// =============================================================================

/// Search requests by result.
pub static SEARCH_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("filmzi_search_requests_total", "Total search requests"),
        &["result"], // "hit", "empty", "error"
    )
    .unwrap()
});

// =============================================================================
// User Metrics
// =============================================================================

/// User events dropped because the writer queue was full or closed.
pub static USER_EVENTS_DROPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "filmzi_user_events_dropped_total",
        "Total user events dropped before reaching the registry",
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(INGEST_MESSAGES.clone()),
        Box::new(EXTRACTION_FALLBACKS.clone()),
        Box::new(BACKFILL_RUNS.clone()),
        Box::new(SEARCH_REQUESTS.clone()),
        Box::new(USER_EVENTS_DROPPED.clone()),
    ]
}

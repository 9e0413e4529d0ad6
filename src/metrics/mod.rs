//! Prometheus metrics for the relay.
//!
//! - Webhook metrics (received, rejected by reason)
//! - Push metrics (sent, failed, provider latency)
//! - Owner registry metrics (lookups, mutations, save failures, size)
//! - Template fallbacks

mod helpers;

pub use helpers::{encode_metrics, OwnerMetrics, PushMetrics, TemplateMetrics, WebhookMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "relay";

lazy_static! {
    // ============================================================================
    // Webhook Metrics
    // ============================================================================

    /// Total webhook requests received
    pub static ref WEBHOOKS_RECEIVED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_webhooks_received_total", METRIC_PREFIX),
        "Total webhook requests received"
    ).unwrap();

    /// Webhook requests rejected before dispatch
    pub static ref WEBHOOKS_REJECTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_webhooks_rejected_total", METRIC_PREFIX),
        "Webhook requests rejected before dispatch",
        &["reason"]
    ).unwrap();

    // ============================================================================
    // Push Metrics
    // ============================================================================

    /// Notifications accepted by the push provider
    pub static ref PUSH_SENT_TOTAL: IntCounter = register_int_counter!(
        format!("{}_push_sent_total", METRIC_PREFIX),
        "Notifications accepted by the push provider"
    ).unwrap();

    /// Failed push attempts
    pub static ref PUSH_FAILED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_push_failed_total", METRIC_PREFIX),
        "Failed push attempts"
    ).unwrap();

    /// Push provider round-trip latency
    pub static ref PUSH_LATENCY: Histogram = register_histogram!(
        format!("{}_push_latency_seconds", METRIC_PREFIX),
        "Push provider round-trip latency in seconds",
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();

    // ============================================================================
    // Owner Metrics
    // ============================================================================

    /// Owner lookups by result (hit / miss)
    pub static ref OWNER_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_owner_lookups_total", METRIC_PREFIX),
        "Owner lookups by result",
        &["result"]
    ).unwrap();

    /// Owner mutations by operation (upsert / delete)
    pub static ref OWNER_MUTATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_owner_mutations_total", METRIC_PREFIX),
        "Owner mapping mutations by operation",
        &["op"]
    ).unwrap();

    /// Failed snapshot writes
    pub static ref OWNER_SAVE_FAILURES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_owner_save_failures_total", METRIC_PREFIX),
        "Failed owner snapshot writes"
    ).unwrap();

    /// Current number of owner mappings
    pub static ref OWNERS_TOTAL: IntGauge = register_int_gauge!(
        format!("{}_owners_total", METRIC_PREFIX),
        "Current number of machine owner mappings"
    ).unwrap();

    // ============================================================================
    // Template Metrics
    // ============================================================================

    /// Renders that fell back from the content template to the default layout
    pub static ref TEMPLATE_FALLBACKS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_template_fallbacks_total", METRIC_PREFIX),
        "Content template renders that fell back to the default layout"
    ).unwrap();
}

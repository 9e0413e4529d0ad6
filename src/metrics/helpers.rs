//! Metric recording helpers.

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use super::*;

/// Encode all registered metrics in Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording webhook metrics
pub struct WebhookMetrics;

impl WebhookMetrics {
    pub fn record_received() {
        WEBHOOKS_RECEIVED_TOTAL.inc();
    }

    /// Record a rejected webhook (`invalid_json`, `missing_token`, ...)
    pub fn record_rejected(reason: &str) {
        WEBHOOKS_REJECTED_TOTAL.with_label_values(&[reason]).inc();
    }
}

/// Helper struct for recording push metrics
pub struct PushMetrics;

impl PushMetrics {
    pub fn record_sent(latency: Duration) {
        PUSH_SENT_TOTAL.inc();
        PUSH_LATENCY.observe(latency.as_secs_f64());
    }

    pub fn record_failed(latency: Duration) {
        PUSH_FAILED_TOTAL.inc();
        PUSH_LATENCY.observe(latency.as_secs_f64());
    }
}

/// Helper struct for recording owner registry metrics
pub struct OwnerMetrics;

impl OwnerMetrics {
    pub fn record_lookup(hit: bool) {
        let result = if hit { "hit" } else { "miss" };
        OWNER_LOOKUPS_TOTAL.with_label_values(&[result]).inc();
    }

    pub fn record_upsert() {
        OWNER_MUTATIONS_TOTAL.with_label_values(&["upsert"]).inc();
    }

    pub fn record_delete() {
        OWNER_MUTATIONS_TOTAL.with_label_values(&["delete"]).inc();
    }

    pub fn record_save_failure() {
        OWNER_SAVE_FAILURES_TOTAL.inc();
    }

    pub fn set_total(count: usize) {
        OWNERS_TOTAL.set(count as i64);
    }
}

/// Helper struct for recording template metrics
pub struct TemplateMetrics;

impl TemplateMetrics {
    pub fn record_fallback() {
        TEMPLATE_FALLBACKS_TOTAL.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_contains_relay_metrics() {
        WebhookMetrics::record_received();
        OwnerMetrics::set_total(3);

        let output = encode_metrics().unwrap();
        assert!(output.contains("relay_webhooks_received_total"));
        assert!(output.contains("relay_owners_total"));
    }

    #[test]
    fn test_lookup_labels() {
        let before = OWNER_LOOKUPS_TOTAL.with_label_values(&["hit"]).get();
        OwnerMetrics::record_lookup(true);
        assert!(OWNER_LOOKUPS_TOTAL.with_label_values(&["hit"]).get() > before);
    }
}

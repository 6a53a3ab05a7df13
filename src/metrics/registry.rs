//! Metrics registry for coordinating phase-specific metrics
//!
//! Registers the metrics of every phase and detects name conflicts early.

use crate::metrics::{MetricDoc, PhaseMetrics};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Register all metrics from all phases
pub fn register_all_metrics() {
    let all_metrics = collect_documentation();
    debug!(
        "Registered {} total metrics across all phases",
        all_metrics.len()
    );
}

/// Register each phase and return the combined documentation keyed by name.
pub fn collect_documentation() -> HashMap<String, MetricDoc> {
    let mut all_metrics = HashMap::new();

    register_phase_metrics::<super::IngestMetrics>(&mut all_metrics);
    register_phase_metrics::<super::FilterMetrics>(&mut all_metrics);
    register_phase_metrics::<super::NormalizeMetrics>(&mut all_metrics);
    register_phase_metrics::<super::DamageMetrics>(&mut all_metrics);
    register_phase_metrics::<super::ReportMetrics>(&mut all_metrics);

    all_metrics
}

/// Register metrics for a specific phase and detect conflicts
fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<String, MetricDoc>) {
    T::register_metrics();
    let phase_name = T::phase_name();

    for doc in T::metrics_documentation() {
        if extract_phase_from_metric_name(doc.name) != phase_name {
            warn!(
                "Metric '{}' does not carry the prefix of phase '{}'",
                doc.name, phase_name
            );
        }
        if all_metrics.contains_key(doc.name) {
            warn!(
                "Metric name conflict detected: '{}' registered again by phase '{}'",
                doc.name, phase_name
            );
        } else {
            all_metrics.insert(doc.name.to_string(), doc);
        }
    }
}

/// Extract phase name from metric name (e.g., "storm_filter_records_kept_total" -> "filter")
fn extract_phase_from_metric_name(metric_name: &str) -> &str {
    if let Some(stripped) = metric_name.strip_prefix("storm_") {
        if let Some(next_underscore) = stripped.find('_') {
            return &stripped[..next_underscore];
        }
    }
    "unknown"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_phase_from_metric_name() {
        assert_eq!(
            extract_phase_from_metric_name("storm_filter_records_kept_total"),
            "filter"
        );
        assert_eq!(
            extract_phase_from_metric_name("storm_normalize_unmatched_rate"),
            "normalize"
        );
        assert_eq!(
            extract_phase_from_metric_name("invalid_metric_name"),
            "unknown"
        );
    }

    #[test]
    fn test_every_documented_metric_is_unique_and_prefixed() {
        let docs = collect_documentation();
        assert_eq!(docs.len(), 21);
        for name in docs.keys() {
            assert!(name.starts_with("storm_"), "{}", name);
            assert_ne!(extract_phase_from_metric_name(name), "unknown");
        }
    }
}

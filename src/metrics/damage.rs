//! Damage Phase Metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct DamageMetrics;

impl DamageMetrics {
    pub fn record_costed(records: usize, unrecognised_units: usize) {
        ::metrics::counter!(phase_metric!(counter, "damage", "records_costed"))
            .increment(records as u64);
        ::metrics::counter!(phase_metric!(counter, "damage", "unrecognised_unit_codes"))
            .increment(unrecognised_units as u64);
    }
}

impl PhaseMetrics for DamageMetrics {
    fn register_metrics() {
        use metrics::counter;

        let _ = counter!(phase_metric!(counter, "damage", "records_costed"));
        let _ = counter!(phase_metric!(counter, "damage", "unrecognised_unit_codes"));
    }

    fn phase_name() -> &'static str {
        "damage"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "damage", "records_costed"),
                metric_type: MetricType::Counter,
                help: "Records with resolved dollar damage",
            },
            MetricDoc {
                name: phase_metric!(counter, "damage", "unrecognised_unit_codes"),
                metric_type: MetricType::Counter,
                help: "Non-empty unit codes other than K, M or B, taken as plain dollars",
            },
        ]
    }
}

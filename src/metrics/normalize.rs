//! Normalize Phase Metrics
//!
//! Category matching outcomes. The unmatched rate gauge is the data-quality
//! signal watched across runs.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};
use crate::pipeline::processing::normalize::NormalizationSummary;

pub struct NormalizeMetrics;

impl NormalizeMetrics {
    pub fn record_summary(summary: &NormalizationSummary, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "normalize", "exact_matches"))
            .increment(summary.exact as u64);
        ::metrics::counter!(phase_metric!(counter, "normalize", "fuzzy_matches"))
            .increment(summary.fuzzy as u64);
        ::metrics::counter!(phase_metric!(counter, "normalize", "unmatched"))
            .increment(summary.unmatched as u64);
        ::metrics::gauge!(phase_metric!(gauge, "normalize", "distinct_categories"))
            .set(summary.distinct_raw as f64);
        ::metrics::gauge!(phase_metric!(gauge, "normalize", "unmatched_rate"))
            .set(summary.unmatched_rate());
        ::metrics::histogram!(phase_metric!(histogram, "normalize", "duration_seconds"))
            .record(duration_secs);
    }
}

impl PhaseMetrics for NormalizeMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge, histogram};

        let _ = counter!(phase_metric!(counter, "normalize", "exact_matches"));
        let _ = counter!(phase_metric!(counter, "normalize", "fuzzy_matches"));
        let _ = counter!(phase_metric!(counter, "normalize", "unmatched"));
        let _ = gauge!(phase_metric!(gauge, "normalize", "distinct_categories"));
        let _ = gauge!(phase_metric!(gauge, "normalize", "unmatched_rate"));
        let _ = histogram!(phase_metric!(histogram, "normalize", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "normalize"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "normalize", "exact_matches"),
                metric_type: MetricType::Counter,
                help: "Records whose cleaned category equals a taxonomy entry",
            },
            MetricDoc {
                name: phase_metric!(counter, "normalize", "fuzzy_matches"),
                metric_type: MetricType::Counter,
                help: "Records matched within the edit-distance tolerance",
            },
            MetricDoc {
                name: phase_metric!(counter, "normalize", "unmatched"),
                metric_type: MetricType::Counter,
                help: "Records with no taxonomy entry within tolerance",
            },
            MetricDoc {
                name: phase_metric!(gauge, "normalize", "distinct_categories"),
                metric_type: MetricType::Gauge,
                help: "Distinct raw category strings resolved in the run",
            },
            MetricDoc {
                name: phase_metric!(gauge, "normalize", "unmatched_rate"),
                metric_type: MetricType::Gauge,
                help: "Share of records left unmatched",
            },
            MetricDoc {
                name: phase_metric!(histogram, "normalize", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent normalizing categories",
            },
        ]
    }
}

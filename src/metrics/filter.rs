//! Filter Phase Metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct FilterMetrics;

impl FilterMetrics {
    pub fn record_outcome(kept: usize, out_of_window: usize, summary_rows: usize) {
        ::metrics::counter!(phase_metric!(counter, "filter", "records_kept"))
            .increment(kept as u64);
        ::metrics::counter!(phase_metric!(counter, "filter", "out_of_window"))
            .increment(out_of_window as u64);
        ::metrics::counter!(phase_metric!(counter, "filter", "summary_rows"))
            .increment(summary_rows as u64);
    }
}

impl PhaseMetrics for FilterMetrics {
    fn register_metrics() {
        use metrics::counter;

        let _ = counter!(phase_metric!(counter, "filter", "records_kept"));
        let _ = counter!(phase_metric!(counter, "filter", "out_of_window"));
        let _ = counter!(phase_metric!(counter, "filter", "summary_rows"));
    }

    fn phase_name() -> &'static str {
        "filter"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "filter", "records_kept"),
                metric_type: MetricType::Counter,
                help: "Records inside the year window that are not summary rows",
            },
            MetricDoc {
                name: phase_metric!(counter, "filter", "out_of_window"),
                metric_type: MetricType::Counter,
                help: "Records dropped for falling outside the year window",
            },
            MetricDoc {
                name: phase_metric!(counter, "filter", "summary_rows"),
                metric_type: MetricType::Counter,
                help: "Monthly summary rows dropped",
            },
        ]
    }
}

//! Report Phase Metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct ReportMetrics;

impl ReportMetrics {
    pub fn record_report(categories: usize, damage_rows: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "report", "reports_written")).increment(1);
        ::metrics::gauge!(phase_metric!(gauge, "report", "categories")).set(categories as f64);
        ::metrics::gauge!(phase_metric!(gauge, "report", "damage_rows_above_floor"))
            .set(damage_rows as f64);
        ::metrics::histogram!(phase_metric!(histogram, "report", "run_duration_seconds"))
            .record(duration_secs);
    }
}

impl PhaseMetrics for ReportMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge, histogram};

        let _ = counter!(phase_metric!(counter, "report", "reports_written"));
        let _ = gauge!(phase_metric!(gauge, "report", "categories"));
        let _ = gauge!(phase_metric!(gauge, "report", "damage_rows_above_floor"));
        let _ = histogram!(phase_metric!(histogram, "report", "run_duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "report"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "report", "reports_written"),
                metric_type: MetricType::Counter,
                help: "Completed report runs",
            },
            MetricDoc {
                name: phase_metric!(gauge, "report", "categories"),
                metric_type: MetricType::Gauge,
                help: "Canonical categories with at least one matched record",
            },
            MetricDoc {
                name: phase_metric!(gauge, "report", "damage_rows_above_floor"),
                metric_type: MetricType::Gauge,
                help: "Categories whose total damage exceeds the reporting floor",
            },
            MetricDoc {
                name: phase_metric!(histogram, "report", "run_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Wall time of the whole pipeline run",
            },
        ]
    }
}

//! Ingest Phase Metrics
//!
//! Fetching and decoding the source artifact.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct IngestMetrics;

impl IngestMetrics {
    pub fn record_download(bytes: u64, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "ingest", "downloads")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "ingest", "bytes_downloaded")).increment(bytes);
        ::metrics::histogram!(phase_metric!(histogram, "ingest", "download_duration_seconds"))
            .record(duration_secs);
    }

    pub fn record_cache_hit() {
        ::metrics::counter!(phase_metric!(counter, "ingest", "cache_hits")).increment(1);
    }

    pub fn record_load(records: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "ingest", "records_loaded"))
            .increment(records as u64);
        ::metrics::histogram!(phase_metric!(histogram, "ingest", "load_duration_seconds"))
            .record(duration_secs);
    }
}

impl PhaseMetrics for IngestMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "ingest", "downloads"));
        let _ = counter!(phase_metric!(counter, "ingest", "bytes_downloaded"));
        let _ = counter!(phase_metric!(counter, "ingest", "cache_hits"));
        let _ = counter!(phase_metric!(counter, "ingest", "records_loaded"));
        let _ = histogram!(phase_metric!(histogram, "ingest", "download_duration_seconds"));
        let _ = histogram!(phase_metric!(histogram, "ingest", "load_duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "ingest"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "ingest", "downloads"),
                metric_type: MetricType::Counter,
                help: "Source artifact downloads performed",
            },
            MetricDoc {
                name: phase_metric!(counter, "ingest", "bytes_downloaded"),
                metric_type: MetricType::Counter,
                help: "Bytes written to the cache by downloads",
            },
            MetricDoc {
                name: phase_metric!(counter, "ingest", "cache_hits"),
                metric_type: MetricType::Counter,
                help: "Runs that reused a cached source artifact",
            },
            MetricDoc {
                name: phase_metric!(counter, "ingest", "records_loaded"),
                metric_type: MetricType::Counter,
                help: "Rows decoded from the source file",
            },
            MetricDoc {
                name: phase_metric!(histogram, "ingest", "download_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent downloading the source artifact",
            },
            MetricDoc {
                name: phase_metric!(histogram, "ingest", "load_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent decompressing and parsing the source file",
            },
        ]
    }
}

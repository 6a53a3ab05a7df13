//! Metrics for the storm report pipeline
//!
//! Each pipeline phase owns its metrics in a dedicated submodule and names them
//! through [`phase_metric!`], so every metric reads `storm_{phase}_{name}`.
//! The report is a batch job: there is no HTTP listener, the recorder is
//! rendered once at the end of a run and written next to the report.

pub mod damage;
pub mod filter;
pub mod ingest;
pub mod normalize;
pub mod registry;
pub mod report;

pub use damage::DamageMetrics;
pub use filter::FilterMetrics;
pub use ingest::IngestMetrics;
pub use normalize::NormalizeMetrics;
pub use report::ReportMetrics;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Once, OnceLock};
use tracing::{debug, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and register every phase's metrics.
///
/// Idempotent. If installation fails (another recorder already installed) the
/// pipeline still runs; metrics calls become no-ops and [`render`] returns `None`.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Prometheus handle was already set");
            }
            registry::register_all_metrics();
            debug!("Prometheus recorder installed");
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    });
}

/// Current metrics snapshot in the Prometheus text format.
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Trait for phase-specific metrics collections
///
/// Each pipeline phase implements this trait to provide:
/// - Metric registration at startup
/// - Consistent naming conventions
/// - Documentation of what each metric measures
pub trait PhaseMetrics {
    /// Register all metrics for this phase
    fn register_metrics();

    /// Get the phase name for prefixing metrics
    fn phase_name() -> &'static str;

    /// Get documentation for all metrics in this phase
    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Macro to create phase-specific metric names with consistent naming
///
/// This ensures all metrics follow the naming convention:
/// storm_{phase}_{metric_name}[_total]
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("storm_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("storm_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("storm_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_naming_convention() {
        assert_eq!(
            phase_metric!(counter, "filter", "records_kept"),
            "storm_filter_records_kept_total"
        );
        assert_eq!(
            phase_metric!(histogram, "ingest", "load_duration_seconds"),
            "storm_ingest_load_duration_seconds"
        );
        assert_eq!(
            phase_metric!(gauge, "normalize", "unmatched_rate"),
            "storm_normalize_unmatched_rate"
        );
    }
}

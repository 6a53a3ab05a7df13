use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::metrics::{self, DamageMetrics, FilterMetrics, IngestMetrics, NormalizeMetrics, ReportMetrics};
use crate::pipeline::ingestion::fetch::{ensure_source, SourceArtifact};
use crate::pipeline::ingestion::loader::load_records;
use crate::pipeline::processing::aggregate::aggregate;
use crate::pipeline::processing::damage::{cost_records, is_known_unit};
use crate::pipeline::processing::filter::{filter_records, YearWindow};
use crate::pipeline::processing::normalize::{check_unmatched_rate, CategoryNormalizer};
use crate::report::{Provenance, RecordCounts, Report, ReportSettings};
use crate::types::RawRecord;

pub const METRICS_FILE: &str = "metrics.prom";

/// Result of a complete pipeline run
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub output_files: Vec<PathBuf>,
    pub categories: usize,
    pub unmatched_rate: f64,
    #[serde(skip)]
    pub report: Report,
}

pub struct Pipeline;

impl Pipeline {
    /// Fetch (or reuse) the source artifact, build the report and write it to
    /// the configured output directory.
    #[instrument(skip(config), fields(start = config.window.start_year, end = config.window.end_year))]
    pub fn run(config: &Config, refresh: bool) -> Result<PipelineResult> {
        let started = Instant::now();

        let fetch_started = Instant::now();
        let artifact = ensure_source(&config.source, refresh)?;
        if artifact.downloaded {
            IngestMetrics::record_download(artifact.bytes, fetch_started.elapsed().as_secs_f64());
        } else {
            IngestMetrics::record_cache_hit();
        }

        let load_started = Instant::now();
        let records = load_records(&artifact.path)?;
        IngestMetrics::record_load(records.len(), load_started.elapsed().as_secs_f64());

        let report = Self::run_records(records, config, Some(&artifact));

        let output_dir = &config.report.output_dir;
        let mut output_files = report.write_to(output_dir)?;

        ReportMetrics::record_report(
            report.harm.len(),
            report.damage.len(),
            started.elapsed().as_secs_f64(),
        );
        if let Some(snapshot) = metrics::render() {
            let metrics_path = output_dir.join(METRICS_FILE);
            fs::write(&metrics_path, snapshot)?;
            output_files.push(metrics_path);
        } else {
            warn!("Metrics recorder not installed; skipping {}", METRICS_FILE);
        }

        info!(
            run_id = %report.provenance.run_id,
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Pipeline run complete"
        );

        Ok(PipelineResult {
            run_id: report.provenance.run_id,
            output_files,
            categories: report.harm.len(),
            unmatched_rate: report.normalization.unmatched_rate(),
            report,
        })
    }

    /// Filter, normalize, cost, aggregate and assemble the report for records
    /// already in memory. No I/O besides logging and metrics.
    pub fn run_records(
        records: Vec<RawRecord>,
        config: &Config,
        artifact: Option<&SourceArtifact>,
    ) -> Report {
        let loaded = records.len();

        let window = YearWindow::from(&config.window);
        let filtered = filter_records(records, window);
        FilterMetrics::record_outcome(
            filtered.kept.len(),
            filtered.out_of_window,
            filtered.summary_rows,
        );
        info!(
            kept = filtered.kept.len(),
            out_of_window = filtered.out_of_window,
            summary_rows = filtered.summary_rows,
            "Filter stage complete"
        );
        let counts = RecordCounts {
            loaded,
            kept: filtered.kept.len(),
            out_of_window: filtered.out_of_window,
            summary_rows: filtered.summary_rows,
        };

        let normalize_started = Instant::now();
        let mut normalizer = CategoryNormalizer::from_config(&config.matching);
        let (normalized, summary) = normalizer.normalize_records(filtered.kept);
        NormalizeMetrics::record_summary(&summary, normalize_started.elapsed().as_secs_f64());
        info!(
            matched = summary.matched,
            unmatched = summary.unmatched,
            distinct = summary.distinct_raw,
            "Normalize stage complete"
        );
        check_unmatched_rate(&summary, config.matching.unmatched_warn_rate);

        let unknown_units = normalized
            .iter()
            .map(|r| {
                usize::from(!is_known_unit(&r.raw.property_damage_unit))
                    + usize::from(!is_known_unit(&r.raw.crop_damage_unit))
            })
            .sum();
        let costed = cost_records(normalized);
        DamageMetrics::record_costed(costed.len(), unknown_units);

        let totals = aggregate(&costed);
        info!(categories = totals.len(), "Aggregate stage complete");

        let provenance = Provenance {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            source_url: artifact
                .map(|a| a.url.clone())
                .unwrap_or_else(|| config.source.url.clone()),
            source_sha256: artifact.map(|a| a.sha256.clone()),
            start_year: window.start_year,
            end_year: window.end_year,
        };
        let settings = ReportSettings {
            top_n: config.report.top_n,
            damage_floor: config.report.damage_floor,
        };

        Report::build(provenance, counts, summary, totals, &settings)
    }
}

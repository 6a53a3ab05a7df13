//! The report artifact: rankings plus the provenance needed to reproduce them.

pub mod chart;
pub mod markdown;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::pipeline::processing::aggregate::{above_floor, rank, CategoryTotals, Measure};
use chart::{render_svg, BarChart, DAMAGE_CHART_FILE, HARM_CHART_FILE};
use crate::pipeline::processing::normalize::NormalizationSummary;

pub const MARKDOWN_FILE: &str = "report.md";
pub const JSON_FILE: &str = "report.json";

/// Where the numbers came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub source_url: String,
    /// SHA-256 of the cached source artifact; `None` for in-memory runs
    pub source_sha256: Option<String>,
    pub start_year: i32,
    pub end_year: i32,
}

/// Row counts at each stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordCounts {
    pub loaded: usize,
    pub kept: usize,
    pub out_of_window: usize,
    pub summary_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub provenance: Provenance,
    pub records: RecordCounts,
    pub normalization: NormalizationSummary,
    /// Top categories by fatalities, injuries alongside
    pub harm: Vec<CategoryTotals>,
    /// Categories whose total damage exceeds `damage_floor`, largest first
    pub damage: Vec<CategoryTotals>,
    pub damage_floor: f64,
    pub findings: Vec<String>,
}

/// Inputs for [`Report::build`] besides the totals themselves
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub top_n: usize,
    pub damage_floor: f64,
}

impl Report {
    pub fn build(
        provenance: Provenance,
        records: RecordCounts,
        normalization: NormalizationSummary,
        totals: Vec<CategoryTotals>,
        settings: &ReportSettings,
    ) -> Self {
        let mut harm = rank(totals.clone(), Measure::Fatalities);
        harm.truncate(settings.top_n);

        let damage = above_floor(
            rank(totals, Measure::TotalDamage),
            Measure::TotalDamage,
            settings.damage_floor,
        );

        let findings = findings(&harm, &damage, &normalization, settings.damage_floor);

        Self {
            provenance,
            records,
            normalization,
            harm,
            damage,
            damage_floor: settings.damage_floor,
            findings,
        }
    }

    pub fn to_markdown(&self) -> String {
        markdown::render(self)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The harm and damage charts, in that order.
    pub fn charts(&self) -> [(&'static str, BarChart); 2] {
        [
            (
                HARM_CHART_FILE,
                BarChart::from_totals(
                    "Most harmful event types (fatalities)",
                    Measure::Fatalities,
                    &self.harm,
                ),
            ),
            (
                DAMAGE_CHART_FILE,
                BarChart::from_totals(
                    format!(
                        "Event types with total damage above {}",
                        markdown::format_usd(self.damage_floor)
                    ),
                    Measure::TotalDamage,
                    &self.damage,
                ),
            ),
        ]
    }

    /// Write `report.md`, `report.json` and one SVG per non-empty ranking into
    /// `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;

        let markdown_path = dir.join(MARKDOWN_FILE);
        fs::write(&markdown_path, self.to_markdown())?;

        let json_path = dir.join(JSON_FILE);
        fs::write(&json_path, self.to_json()?)?;

        let mut written = vec![markdown_path, json_path];
        for (file_name, chart) in self.charts() {
            if chart.is_empty() {
                continue;
            }
            let chart_path = dir.join(file_name);
            fs::write(&chart_path, render_svg(&chart)?)?;
            written.push(chart_path);
        }

        info!(dir = %dir.display(), run_id = %self.provenance.run_id, files = written.len(), "Report written");
        Ok(written)
    }
}

/// Plain-language statements answering the two report questions.
fn findings(
    harm: &[CategoryTotals],
    damage: &[CategoryTotals],
    normalization: &NormalizationSummary,
    damage_floor: f64,
) -> Vec<String> {
    let mut lines = Vec::new();

    match harm.first() {
        Some(top) if top.fatalities > 0 => lines.push(format!(
            "{} caused the most fatalities ({}) along with {} injuries.",
            top.category, top.fatalities, top.injuries
        )),
        _ => lines.push("No fatalities were recorded in the window.".to_string()),
    }

    if let Some(most_injuries) = harm.iter().max_by(|a, b| {
        a.injuries
            .cmp(&b.injuries)
            .then_with(|| b.category.cmp(&a.category))
    }) {
        if most_injuries.injuries > 0 {
            lines.push(format!(
                "Among the top categories, {} caused the most injuries ({}).",
                most_injuries.category, most_injuries.injuries
            ));
        }
    }

    match damage.first() {
        Some(top) => lines.push(format!(
            "{} caused the greatest economic damage ({}); {} categories exceed {}.",
            top.category,
            markdown::format_usd(top.total_damage),
            damage.len(),
            markdown::format_usd(damage_floor)
        )),
        None => lines.push(format!(
            "No category exceeds {} in total damage.",
            markdown::format_usd(damage_floor)
        )),
    }

    lines.push(format!(
        "{:.2}% of records ({} of {}) could not be matched to an official event type.",
        normalization.unmatched_rate() * 100.0,
        normalization.unmatched,
        normalization.total
    ));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(category: &str, fatalities: u64, injuries: u64, damage: f64) -> CategoryTotals {
        CategoryTotals {
            category: category.to_string(),
            event_count: 1,
            fatalities,
            injuries,
            property_damage: damage,
            crop_damage: 0.0,
            total_damage: damage,
        }
    }

    fn provenance() -> Provenance {
        Provenance {
            run_id: Uuid::nil(),
            generated_at: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            source_url: "https://example.invalid/StormData.csv.bz2".to_string(),
            source_sha256: Some("abc123".to_string()),
            start_year: 1996,
            end_year: 2011,
        }
    }

    fn sample() -> Report {
        let summary = NormalizationSummary {
            total: 10,
            matched: 9,
            unmatched: 1,
            exact: 8,
            fuzzy: 1,
            distinct_raw: 5,
            top_unmatched: vec![("OTHER".to_string(), 1)],
        };
        Report::build(
            provenance(),
            RecordCounts {
                loaded: 12,
                kept: 10,
                out_of_window: 1,
                summary_rows: 1,
            },
            summary,
            vec![
                totals("FLOOD", 3, 10, 2.5e9),
                totals("HEAT", 7, 40, 1.0e6),
                totals("HURRICANE", 1, 0, 8.0e10),
                totals("HAIL", 0, 2, 1.0e9),
            ],
            &ReportSettings {
                top_n: 3,
                damage_floor: 1e9,
            },
        )
    }

    #[test]
    fn test_build_ranks_and_thresholds() {
        let report = sample();
        let harm: Vec<_> = report.harm.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(harm, vec!["HEAT", "FLOOD", "HURRICANE"]);

        let damage: Vec<_> = report.damage.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(damage, vec!["HURRICANE", "FLOOD"]);
    }

    #[test]
    fn test_findings_name_the_leaders() {
        let report = sample();
        assert!(report.findings[0].starts_with("HEAT caused the most fatalities (7)"));
        assert!(report.findings[1].contains("HEAT caused the most injuries (40)"));
        assert!(report.findings[2].starts_with("HURRICANE caused the greatest economic damage"));
        assert!(report.findings[3].starts_with("10.00% of records (1 of 10)"));
    }

    #[test]
    fn test_json_round_trips_provenance() {
        let report = sample();
        let json = report.to_json().unwrap();
        let parsed: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.provenance, report.provenance);
        assert_eq!(parsed.damage.len(), 2);
    }

    #[test]
    fn test_write_to_creates_documents_and_charts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let paths = sample().write_to(&out).unwrap();
        assert_eq!(paths.len(), 4);
        assert!(out.join(MARKDOWN_FILE).exists());
        assert!(out.join(JSON_FILE).exists());

        let harm = fs::read_to_string(out.join(HARM_CHART_FILE)).unwrap();
        assert!(harm.contains("<svg"));
        let damage = fs::read_to_string(out.join(DAMAGE_CHART_FILE)).unwrap();
        assert!(damage.contains("HURRICANE"));

        let markdown = fs::read_to_string(out.join(MARKDOWN_FILE)).unwrap();
        assert!(markdown.contains("](harm.svg)"));
        assert!(markdown.contains("](damage.svg)"));
    }

    #[test]
    fn test_empty_damage_ranking_skips_its_chart() {
        let mut report = sample();
        report.damage.clear();
        let dir = tempfile::tempdir().unwrap();
        let paths = report.write_to(dir.path()).unwrap();
        assert_eq!(paths.len(), 3);
        assert!(dir.path().join(HARM_CHART_FILE).exists());
        assert!(!dir.path().join(DAMAGE_CHART_FILE).exists());
        let markdown = fs::read_to_string(dir.path().join(MARKDOWN_FILE)).unwrap();
        assert!(!markdown.contains("damage.svg"));
    }
}

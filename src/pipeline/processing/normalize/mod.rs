//! Category normalization: reconcile free-text event labels with the official
//! taxonomy.
//!
//! A raw label is cleaned with the full rewrite table, then resolved against the
//! cleaned taxonomy by exact lookup or, failing that, by nearest edit distance
//! within the configured tolerance. Labels repeat heavily in the source data, so
//! each distinct label is resolved once and memoized.

pub mod rules;
pub mod taxonomy;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::MatchingConfig;
use crate::types::{NormalizedRecord, RawRecord};
use rules::RuleSet;
use taxonomy::{CategoryMatch, CategoryResolver, EditDistanceMatcher, Taxonomy};

/// How many unmatched labels the summary lists
const TOP_UNMATCHED_LIMIT: usize = 20;

/// Result of normalizing one distinct raw label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub cleaned: String,
    pub matched: Option<CategoryMatch>,
}

/// Counts describing a normalization run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationSummary {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Matched at distance zero
    pub exact: usize,
    /// Matched at a non-zero distance within tolerance
    pub fuzzy: usize,
    pub distinct_raw: usize,
    /// Most frequent unmatched cleaned labels with their record counts
    pub top_unmatched: Vec<(String, usize)>,
}

impl NormalizationSummary {
    pub fn unmatched_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.unmatched as f64 / self.total as f64
        }
    }
}

/// Cleans and resolves event categories, remembering each distinct label
pub struct CategoryNormalizer<R: CategoryResolver = EditDistanceMatcher> {
    rules: RuleSet,
    resolver: R,
    memo: HashMap<String, Resolution>,
}

impl CategoryNormalizer<EditDistanceMatcher> {
    /// Normalizer over the official taxonomy with the given edit tolerance.
    pub fn official(tolerance: usize) -> Self {
        Self::new(EditDistanceMatcher::new(Taxonomy::official(), tolerance))
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::official(config.tolerance)
    }
}

impl<R: CategoryResolver> CategoryNormalizer<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            rules: RuleSet::raw(),
            resolver,
            memo: HashMap::new(),
        }
    }

    /// Clean `raw` with the full rule table.
    pub fn clean(&self, raw: &str) -> String {
        self.rules.normalize(raw)
    }

    /// Resolve a raw label, consulting the memo first.
    pub fn resolve(&mut self, raw: &str) -> &Resolution {
        if !self.memo.contains_key(raw) {
            let cleaned = self.clean(raw);
            let matched = self.resolver.resolve(&cleaned);
            debug!(raw, cleaned = %cleaned, matched = ?matched, "Resolved category");
            self.memo
                .insert(raw.to_string(), Resolution { cleaned, matched });
        }
        &self.memo[raw]
    }

    /// Number of distinct raw labels seen so far
    pub fn distinct_seen(&self) -> usize {
        self.memo.len()
    }

    pub fn normalize_record(&mut self, raw: RawRecord) -> NormalizedRecord {
        let resolution = self.resolve(&raw.raw_category).clone();
        let (canonical_category, match_distance) = match resolution.matched {
            Some(found) => (Some(found.canonical), Some(found.distance)),
            None => (None, None),
        };
        NormalizedRecord {
            raw,
            cleaned_category: resolution.cleaned,
            canonical_category,
            match_distance,
        }
    }

    /// Normalize a batch of records, preserving order and count.
    pub fn normalize_records(
        &mut self,
        records: Vec<RawRecord>,
    ) -> (Vec<NormalizedRecord>, NormalizationSummary) {
        let mut summary = NormalizationSummary::default();
        let mut unmatched_counts: HashMap<String, usize> = HashMap::new();
        let mut normalized = Vec::with_capacity(records.len());

        for raw in records {
            let record = self.normalize_record(raw);
            summary.total += 1;
            match record.match_distance {
                Some(0) => {
                    summary.matched += 1;
                    summary.exact += 1;
                }
                Some(_) => {
                    summary.matched += 1;
                    summary.fuzzy += 1;
                }
                None => {
                    summary.unmatched += 1;
                    *unmatched_counts
                        .entry(record.cleaned_category.clone())
                        .or_insert(0) += 1;
                }
            }
            normalized.push(record);
        }

        summary.distinct_raw = self.memo.len();
        let mut top: Vec<(String, usize)> = unmatched_counts.into_iter().collect();
        top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top.truncate(TOP_UNMATCHED_LIMIT);
        summary.top_unmatched = top;

        (normalized, summary)
    }
}

/// Log a warning when the unmatched share exceeds `warn_rate`.
pub fn check_unmatched_rate(summary: &NormalizationSummary, warn_rate: f64) -> bool {
    let rate = summary.unmatched_rate();
    if rate > warn_rate {
        warn!(
            unmatched = summary.unmatched,
            total = summary.total,
            rate,
            threshold = warn_rate,
            "Unmatched category share above threshold"
        );
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(category: &str) -> RawRecord {
        RawRecord {
            observed_at: NaiveDate::from_ymd_opt(2000, 6, 1).unwrap(),
            region: "TX".to_string(),
            raw_category: category.to_string(),
            fatalities: 0,
            injuries: 0,
            property_damage_magnitude: 0.0,
            property_damage_unit: String::new(),
            crop_damage_magnitude: 0.0,
            crop_damage_unit: String::new(),
        }
    }

    #[test]
    fn test_source_variants_resolve_to_official_entries() {
        let mut normalizer = CategoryNormalizer::official(1);
        let cases = [
            ("TSTM WIND", "THUNDERSTORM WIND", 0),
            ("TSTM WIND (G45)", "THUNDERSTORM WIND", 0),
            ("Tstm Wind", "THUNDERSTORM WIND", 0),
            ("  tstm   wind  ", "THUNDERSTORM WIND", 0),
            ("THUNDERSTORM WINDS.", "THUNDERSTORM WIND", 0),
            ("FLASH FLOODING", "FLOOD", 0),
            ("URBAN/SML STREAM FLD", "FLOOD", 0),
            ("RECORD COLD", "COLD/WIND CHILL", 0),
            ("EXTREME COLD/WIND CHILL", "COLD/WIND CHILL", 0),
            ("HURRICANE/TYPHOON", "HURRICANE", 0),
            ("WILD/FOREST FIRE", "WILDFIRE", 0),
            ("HEAVY RAINS", "RAIN", 0),
            ("HAIL 0.75", "HAIL", 0),
            ("NON-TSTM WIND", "STRONG WIND", 0),
            ("LIGNTNING", "LIGHTNING", 1),
        ];
        for (raw, canonical, distance) in cases {
            let resolution = normalizer.resolve(raw);
            let found = resolution
                .matched
                .as_ref()
                .unwrap_or_else(|| panic!("{:?} did not match", raw));
            assert_eq!(found.canonical, canonical, "for {:?}", raw);
            assert_eq!(found.distance, distance, "for {:?}", raw);
        }
    }

    #[test]
    fn test_unmatched_labels_keep_cleaned_text() {
        let mut normalizer = CategoryNormalizer::official(1);
        let resolution = normalizer.resolve("Heavy Rain/Severe Weather").clone();
        assert_eq!(resolution.cleaned, "RAIN/WEATHER");
        assert_eq!(resolution.matched, None);
        assert_eq!(normalizer.resolve("OTHER").matched, None);
    }

    #[test]
    fn test_memo_resolves_each_label_once() {
        let mut normalizer = CategoryNormalizer::official(1);
        let records = vec![
            record("TSTM WIND"),
            record("TSTM WIND"),
            record("HAIL"),
            record("TSTM WIND"),
        ];
        let (normalized, summary) = normalizer.normalize_records(records);
        assert_eq!(normalized.len(), 4);
        assert_eq!(normalizer.distinct_seen(), 2);
        assert_eq!(summary.distinct_raw, 2);
    }

    #[test]
    fn test_summary_counts_and_order() {
        let mut normalizer = CategoryNormalizer::official(1);
        let records = vec![
            record("TORNADO"),
            record("LIGHTNIN"),
            record("OTHER"),
            record("OTHER"),
            record("NORTHERN LIGHTS"),
        ];
        let (normalized, summary) = normalizer.normalize_records(records);

        let categories: Vec<_> = normalized
            .iter()
            .map(|r| r.raw.raw_category.as_str())
            .collect();
        assert_eq!(
            categories,
            vec!["TORNADO", "LIGHTNIN", "OTHER", "OTHER", "NORTHERN LIGHTS"]
        );
        assert_eq!(summary.total, 5);
        assert_eq!(summary.matched, 2);
        assert_eq!(summary.exact, 1);
        assert_eq!(summary.fuzzy, 1);
        assert_eq!(summary.unmatched, 3);
        assert_eq!(summary.top_unmatched[0], ("OTHER".to_string(), 2));
        assert!((summary.unmatched_rate() - 0.6).abs() < 1e-9);
        assert!(check_unmatched_rate(&summary, 0.05));
        assert!(!check_unmatched_rate(&summary, 0.9));
    }

    #[test]
    fn test_empty_batch() {
        let mut normalizer = CategoryNormalizer::official(1);
        let (normalized, summary) = normalizer.normalize_records(Vec::new());
        assert!(normalized.is_empty());
        assert_eq!(summary.unmatched_rate(), 0.0);
    }
}

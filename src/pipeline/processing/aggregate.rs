use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::types::CostedRecord;

/// Per-category sums over matched records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub category: String,
    pub event_count: u64,
    pub fatalities: u64,
    pub injuries: u64,
    pub property_damage: f64,
    pub crop_damage: f64,
    pub total_damage: f64,
}

impl CategoryTotals {
    fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            ..Default::default()
        }
    }

    fn add(&mut self, record: &CostedRecord) {
        self.event_count += 1;
        self.fatalities += u64::from(record.record.raw.fatalities);
        self.injuries += u64::from(record.record.raw.injuries);
        self.property_damage += record.damage.property_damage;
        self.crop_damage += record.damage.crop_damage;
        self.total_damage += record.damage.total_damage;
    }

    pub fn casualties(&self) -> u64 {
        self.fatalities + self.injuries
    }

    pub fn value(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Fatalities => self.fatalities as f64,
            Measure::Injuries => self.injuries as f64,
            Measure::Casualties => self.casualties() as f64,
            Measure::PropertyDamage => self.property_damage,
            Measure::CropDamage => self.crop_damage,
            Measure::TotalDamage => self.total_damage,
        }
    }
}

/// What a ranking is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Fatalities,
    Injuries,
    Casualties,
    PropertyDamage,
    CropDamage,
    TotalDamage,
}

impl Measure {
    pub fn label(&self) -> &'static str {
        match self {
            Measure::Fatalities => "Fatalities",
            Measure::Injuries => "Injuries",
            Measure::Casualties => "Fatalities + injuries",
            Measure::PropertyDamage => "Property damage (USD)",
            Measure::CropDamage => "Crop damage (USD)",
            Measure::TotalDamage => "Total damage (USD)",
        }
    }

    pub fn is_monetary(&self) -> bool {
        matches!(
            self,
            Measure::PropertyDamage | Measure::CropDamage | Measure::TotalDamage
        )
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sum matched records per canonical category. Unmatched records are skipped;
/// output is ordered by category name.
pub fn aggregate(records: &[CostedRecord]) -> Vec<CategoryTotals> {
    let mut by_category: HashMap<&str, CategoryTotals> = HashMap::new();

    for record in records {
        let Some(category) = record.canonical_category() else {
            continue;
        };
        by_category
            .entry(category)
            .or_insert_with(|| CategoryTotals::new(category))
            .add(record);
    }

    let mut totals: Vec<CategoryTotals> = by_category.into_values().collect();
    totals.sort_by(|a, b| a.category.cmp(&b.category));
    totals
}

/// Sort descending by `measure`, ties broken by category name ascending.
pub fn rank(mut totals: Vec<CategoryTotals>, measure: Measure) -> Vec<CategoryTotals> {
    totals.sort_by(|a, b| {
        b.value(measure)
            .partial_cmp(&a.value(measure))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    totals
}

/// Rows whose `measure` strictly exceeds `floor`, order preserved.
pub fn above_floor(totals: Vec<CategoryTotals>, measure: Measure, floor: f64) -> Vec<CategoryTotals> {
    totals
        .into_iter()
        .filter(|row| row.value(measure) > floor)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DamageFigures, NormalizedRecord, RawRecord};
    use chrono::NaiveDate;

    fn costed(category: Option<&str>, fatalities: u32, injuries: u32, damage: f64) -> CostedRecord {
        CostedRecord {
            record: NormalizedRecord {
                raw: RawRecord {
                    observed_at: NaiveDate::from_ymd_opt(2004, 5, 1).unwrap(),
                    region: "MO".to_string(),
                    raw_category: category.unwrap_or("OTHER").to_string(),
                    fatalities,
                    injuries,
                    property_damage_magnitude: damage,
                    property_damage_unit: String::new(),
                    crop_damage_magnitude: 0.0,
                    crop_damage_unit: String::new(),
                },
                cleaned_category: category.unwrap_or("OTHER").to_string(),
                canonical_category: category.map(str::to_string),
                match_distance: category.map(|_| 0),
            },
            damage: DamageFigures {
                property_damage: damage,
                crop_damage: 0.0,
                total_damage: damage,
            },
        }
    }

    #[test]
    fn test_sums_per_category() {
        let records = vec![
            costed(Some("FLOOD"), 1, 0, 10.0),
            costed(Some("FLOOD"), 0, 4, 20.0),
            costed(Some("FLOOD"), 2, 1, 30.0),
            costed(Some("HAIL"), 1, 0, 5.0),
        ];
        let totals = aggregate(&records);
        assert_eq!(totals.len(), 2);

        let flood = &totals[0];
        assert_eq!(flood.category, "FLOOD");
        assert_eq!(flood.fatalities, 3);
        assert_eq!(flood.injuries, 5);
        assert_eq!(flood.casualties(), 8);
        assert_eq!(flood.event_count, 3);
        assert_eq!(flood.total_damage, 60.0);

        let ranked = rank(totals, Measure::Fatalities);
        assert_eq!(ranked[0].category, "FLOOD");
        assert_eq!(ranked[1].category, "HAIL");
    }

    #[test]
    fn test_unmatched_records_are_excluded() {
        let records = vec![costed(None, 50, 50, 1e12), costed(Some("HEAT"), 1, 0, 0.0)];
        let totals = aggregate(&records);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].category, "HEAT");
        assert_eq!(totals[0].fatalities, 1);
    }

    #[test]
    fn test_rank_ties_by_name() {
        let records = vec![
            costed(Some("TORNADO"), 2, 0, 0.0),
            costed(Some("HEAT"), 2, 0, 0.0),
            costed(Some("LIGHTNING"), 5, 0, 0.0),
        ];
        let ranked = rank(aggregate(&records), Measure::Fatalities);
        let names: Vec<_> = ranked.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(names, vec!["LIGHTNING", "HEAT", "TORNADO"]);
    }

    #[test]
    fn test_above_floor_is_strict() {
        let records = vec![
            costed(Some("HURRICANE"), 0, 0, 2e9),
            costed(Some("FLOOD"), 0, 0, 1e9),
            costed(Some("HAIL"), 0, 0, 5e8),
        ];
        let ranked = rank(aggregate(&records), Measure::TotalDamage);
        let kept = above_floor(ranked, Measure::TotalDamage, 1e9);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].category, "HURRICANE");
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[]).is_empty());
        assert!(rank(Vec::new(), Measure::Injuries).is_empty());
    }
}

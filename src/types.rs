use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One storm event row as loaded from the source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub observed_at: NaiveDate,
    pub region: String,
    pub raw_category: String,
    pub fatalities: u32,
    pub injuries: u32,
    pub property_damage_magnitude: f64,
    pub property_damage_unit: String,
    pub crop_damage_magnitude: f64,
    pub crop_damage_unit: String,
}

impl RawRecord {
    pub fn year(&self) -> i32 {
        self.observed_at.year()
    }
}

/// A raw record with its category reconciled against the official taxonomy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub raw: RawRecord,
    /// Category text after the rewrite rules ran
    pub cleaned_category: String,
    /// `None` when no taxonomy entry is within the matching tolerance
    pub canonical_category: Option<String>,
    /// Edit distance to `canonical_category`; `None` when unmatched
    pub match_distance: Option<usize>,
}

/// Resolved dollar amounts for one record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageFigures {
    pub property_damage: f64,
    pub crop_damage: f64,
    pub total_damage: f64,
}

/// A normalized record carrying its damage figures; input to aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostedRecord {
    pub record: NormalizedRecord,
    pub damage: DamageFigures,
}

impl CostedRecord {
    pub fn canonical_category(&self) -> Option<&str> {
        self.record.canonical_category.as_deref()
    }
}

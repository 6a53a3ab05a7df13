//! Dollar damage from the source's magnitude and unit-code columns.

use crate::types::{CostedRecord, DamageFigures, NormalizedRecord, RawRecord};

/// Multiplier for a damage unit code.
///
/// `K`, `M` and `B` (thousands, millions, billions) are recognised after trimming.
/// Matching is case-sensitive: every other code, lowercase letters and the empty
/// string included, is taken as plain dollars.
pub fn unit_multiplier(unit: &str) -> f64 {
    match unit.trim() {
        "K" => 1e3,
        "M" => 1e6,
        "B" => 1e9,
        _ => 1.0,
    }
}

/// Whether `unit` is one of the codes the export documents (or empty).
pub fn is_known_unit(unit: &str) -> bool {
    matches!(unit.trim(), "" | "K" | "M" | "B")
}

pub fn resolve_amount(magnitude: f64, unit: &str) -> f64 {
    magnitude * unit_multiplier(unit)
}

impl DamageFigures {
    pub fn compute(record: &RawRecord) -> Self {
        let property_damage =
            resolve_amount(record.property_damage_magnitude, &record.property_damage_unit);
        let crop_damage = resolve_amount(record.crop_damage_magnitude, &record.crop_damage_unit);
        Self {
            property_damage,
            crop_damage,
            total_damage: property_damage + crop_damage,
        }
    }
}

pub fn cost_record(record: NormalizedRecord) -> CostedRecord {
    let damage = DamageFigures::compute(&record.raw);
    CostedRecord { record, damage }
}

pub fn cost_records(records: Vec<NormalizedRecord>) -> Vec<CostedRecord> {
    records.into_iter().map(cost_record).collect()
}

use serde::Serialize;
use std::collections::HashMap;

use super::rules::RuleSet;
use crate::constants::OFFICIAL_EVENT_TYPES;

/// One entry of the cleaned taxonomy with the official names it stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyEntry {
    /// Official name after the shared rewrite rules
    pub canonical: String,
    /// Official directive names that clean to `canonical`, in directive order
    pub official_names: Vec<&'static str>,
}

/// The official event types expressed in normalized space.
///
/// Several official names collapse onto one entry once qualifiers are removed
/// ("Flash Flood", "Coastal Flood" and "Flood" all become `FLOOD`). Entries keep
/// the order of their first official name, which is the tie-break order used by
/// the matcher.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    entries: Vec<TaxonomyEntry>,
    index: HashMap<String, usize>,
}

impl Taxonomy {
    /// The 48 directive event types cleaned with the taxonomy rule view.
    pub fn official() -> Self {
        Self::from_names(&OFFICIAL_EVENT_TYPES, RuleSet::taxonomy())
    }

    pub fn from_names(names: &[&'static str], rules: RuleSet) -> Self {
        let mut entries: Vec<TaxonomyEntry> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for &name in names {
            let canonical = rules.normalize(name);
            if canonical.is_empty() {
                continue;
            }
            match index.get(&canonical) {
                Some(&position) => entries[position].official_names.push(name),
                None => {
                    index.insert(canonical.clone(), entries.len());
                    entries.push(TaxonomyEntry {
                        canonical,
                        official_names: vec![name],
                    });
                }
            }
        }

        Self { entries, index }
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.index.contains_key(canonical)
    }

    pub fn get(&self, canonical: &str) -> Option<&TaxonomyEntry> {
        self.index.get(canonical).map(|&position| &self.entries[position])
    }
}

/// Outcome of resolving a cleaned category against the taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryMatch {
    pub canonical: String,
    pub distance: usize,
}

/// Resolves a cleaned category to a taxonomy entry
pub trait CategoryResolver {
    /// `None` when nothing is close enough
    fn resolve(&self, cleaned: &str) -> Option<CategoryMatch>;
}

/// Nearest taxonomy entry by Levenshtein distance, within a tolerance
#[derive(Debug, Clone)]
pub struct EditDistanceMatcher {
    taxonomy: Taxonomy,
    tolerance: usize,
}

impl EditDistanceMatcher {
    pub fn new(taxonomy: Taxonomy, tolerance: usize) -> Self {
        Self {
            taxonomy,
            tolerance,
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Closest entry regardless of tolerance; the first entry wins ties.
    pub fn nearest(&self, cleaned: &str) -> Option<CategoryMatch> {
        if self.taxonomy.contains(cleaned) {
            return Some(CategoryMatch {
                canonical: cleaned.to_string(),
                distance: 0,
            });
        }

        let mut best: Option<(usize, &TaxonomyEntry)> = None;
        for entry in self.taxonomy.entries() {
            let distance = strsim::levenshtein(cleaned, &entry.canonical);
            // Strict comparison keeps the earliest entry on ties
            if best.map_or(true, |(best_distance, _)| distance < best_distance) {
                best = Some((distance, entry));
            }
        }

        best.map(|(distance, entry)| CategoryMatch {
            canonical: entry.canonical.clone(),
            distance,
        })
    }
}

impl CategoryResolver for EditDistanceMatcher {
    fn resolve(&self, cleaned: &str) -> Option<CategoryMatch> {
        if cleaned.is_empty() {
            return None;
        }
        self.nearest(cleaned)
            .filter(|found| found.distance <= self.tolerance)
    }
}

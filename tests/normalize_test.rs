use storm_report::constants::OFFICIAL_EVENT_TYPES;
use storm_report::pipeline::processing::normalize::rules::RuleSet;
use storm_report::pipeline::processing::normalize::taxonomy::{
    CategoryResolver, EditDistanceMatcher, Taxonomy,
};
use storm_report::pipeline::processing::normalize::CategoryNormalizer;

const SOURCE_LABELS: &[&str] = &[
    "TSTM WIND",
    "THUNDERSTORM WINDS",
    "THUNDERSTORM WIND 60 MPH",
    "MARINE TSTM WIND",
    "FLASH FLOOD",
    "FLASH FLOOD/FLOOD",
    "URBAN/SML STREAM FLD",
    "COASTAL FLOODING",
    "RIP CURRENTS",
    "EXCESSIVE HEAT",
    "HEAT WAVE",
    "EXTREME COLD",
    "FOG",
    "WINTER WEATHER/MIX",
    "HURRICANE/TYPHOON",
    "STORM SURGE",
    "WILD/FOREST FIRE",
    "LANDSLIDE",
    "Other",
    "Heavy Rain/Severe Weather",
];

#[test]
fn cleaning_is_idempotent() {
    let rules = RuleSet::raw();
    for label in SOURCE_LABELS.iter().chain(OFFICIAL_EVENT_TYPES.iter()) {
        let once = rules.normalize(label);
        assert_eq!(rules.normalize(&once), once, "label {:?}", label);
    }
}

#[test]
fn official_names_match_themselves_exactly() {
    let mut normalizer = CategoryNormalizer::official(1);
    for name in OFFICIAL_EVENT_TYPES {
        let resolution = normalizer.resolve(name);
        let found = resolution
            .matched
            .as_ref()
            .unwrap_or_else(|| panic!("{:?} did not match", name));
        assert_eq!(found.distance, 0, "official name {:?}", name);
    }
}

#[test]
fn every_official_name_is_represented() {
    let taxonomy = Taxonomy::official();
    let represented: usize = taxonomy
        .entries()
        .iter()
        .map(|entry| entry.official_names.len())
        .sum();
    assert_eq!(represented, OFFICIAL_EVENT_TYPES.len());
}

#[test]
fn tolerance_separates_near_and_far_misses() {
    let matcher = EditDistanceMatcher::new(Taxonomy::official(), 1);
    assert_eq!(matcher.resolve("AVALANCE").unwrap().canonical, "AVALANCHE");
    assert_eq!(matcher.resolve("TORNDAO"), None);
}

#[test]
fn documented_end_to_end_examples() {
    let mut normalizer = CategoryNormalizer::official(1);
    for (raw, canonical) in [
        ("TSTM WIND", "THUNDERSTORM WIND"),
        ("FLASH FLOODING", "FLOOD"),
        ("RECORD COLD", "COLD/WIND CHILL"),
    ] {
        let found = normalizer.resolve(raw).matched.clone().unwrap();
        assert_eq!(found.canonical, canonical);
        assert_eq!(found.distance, 0);
    }
}

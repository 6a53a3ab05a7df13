//! Source artifact and report constants shared across the pipeline.

/// Public mirror of the NOAA storm events export used by the report.
pub const SOURCE_URL: &str =
    "https://d396qusza40orc.cloudfront.net/repdata%2Fdata%2FStormData.csv.bz2";

/// File name the artifact is cached under inside the cache directory.
pub const SOURCE_FILE_NAME: &str = "StormData.csv.bz2";

pub const DEFAULT_CACHE_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

// The export only records every event type from 1996 on; earlier years hold
// tornado, wind and hail reports only.
pub const DEFAULT_START_YEAR: i32 = 1996;
pub const DEFAULT_END_YEAR: i32 = 2011;

/// Rows whose category starts with this literal are monthly summaries, not events.
pub const SUMMARY_ROW_MARKER: &str = "Summary";

/// Maximum single-character edits between a cleaned category and a taxonomy entry.
pub const DEFAULT_MATCH_TOLERANCE: usize = 1;

/// Economic ranking only shows categories whose total damage exceeds this many dollars.
pub const DEFAULT_DAMAGE_FLOOR: f64 = 1_000_000_000.0;

pub const DEFAULT_TOP_N: usize = 10;

/// Unmatched share above which the run logs a data-quality warning.
pub const DEFAULT_UNMATCHED_WARN_RATE: f64 = 0.05;

/// The 48 official event types from NWS Directive 10-1605, in directive order.
pub const OFFICIAL_EVENT_TYPES: [&str; 48] = [
    "Astronomical Low Tide",
    "Avalanche",
    "Blizzard",
    "Coastal Flood",
    "Cold/Wind Chill",
    "Debris Flow",
    "Dense Fog",
    "Dense Smoke",
    "Drought",
    "Dust Devil",
    "Dust Storm",
    "Excessive Heat",
    "Extreme Cold/Wind Chill",
    "Flash Flood",
    "Flood",
    "Frost/Freeze",
    "Funnel Cloud",
    "Freezing Fog",
    "Hail",
    "Heat",
    "Heavy Rain",
    "Heavy Snow",
    "High Surf",
    "High Wind",
    "Hurricane (Typhoon)",
    "Ice Storm",
    "Lake-Effect Snow",
    "Lakeshore Flood",
    "Lightning",
    "Marine Hail",
    "Marine High Wind",
    "Marine Strong Wind",
    "Marine Thunderstorm Wind",
    "Rip Current",
    "Seiche",
    "Sleet",
    "Storm Surge/Tide",
    "Strong Wind",
    "Thunderstorm Wind",
    "Tornado",
    "Tropical Depression",
    "Tropical Storm",
    "Tsunami",
    "Volcanic Ash",
    "Waterspout",
    "Wildfire",
    "Winter Storm",
    "Winter Weather",
];

/// Source CSV column names consumed by the loader.
pub mod columns {
    pub const BEGIN_DATE: &str = "BGN_DATE";
    pub const STATE: &str = "STATE";
    pub const EVENT_TYPE: &str = "EVTYPE";
    pub const FATALITIES: &str = "FATALITIES";
    pub const INJURIES: &str = "INJURIES";
    pub const PROPERTY_DAMAGE: &str = "PROPDMG";
    pub const PROPERTY_DAMAGE_EXP: &str = "PROPDMGEXP";
    pub const CROP_DAMAGE: &str = "CROPDMG";
    pub const CROP_DAMAGE_EXP: &str = "CROPDMGEXP";
}

//! Ordered rewrite table that cleans free-text event categories.
//!
//! Every rule is a `(pattern, replacement, anchor)` triple plus the scope it
//! applies to. Rules run top to bottom on the uppercased input; later rules rely
//! on earlier ones having fired (abbreviations are expanded before the
//! consolidation patterns look for the expanded words, qualifiers are gone
//! before the whole-string touch-ups run).
//!
//! `Shared` rules run on both raw categories and the official taxonomy so the two
//! sides are compared in the same normalized space. `RawOnly` rules handle quirks
//! that only occur in the source data (gust annotations, stray punctuation,
//! plurals).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// Upper bound on repeated passes in [`RuleSet::normalize`].
const MAX_PASSES: usize = 4;

/// Where a rule's pattern must sit in the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Anchor {
    /// Any substring
    Anywhere,
    /// Prefix of the text
    Start,
    /// Suffix of the text
    End,
    /// The entire text
    Whole,
}

impl Anchor {
    fn wrap(self, pattern: &str) -> String {
        match self {
            Anchor::Anywhere => format!("(?:{})", pattern),
            Anchor::Start => format!("^(?:{})", pattern),
            Anchor::End => format!("(?:{})$", pattern),
            Anchor::Whole => format!("^(?:{})$", pattern),
        }
    }
}

/// Which side of the comparison a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuleScope {
    Shared,
    RawOnly,
}

/// What a rule is for; documentation only, order is what matters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuleFamily {
    RawQuirk,
    Abbreviation,
    Qualifier,
    Tidy,
    Consolidation,
    TouchUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewriteRule {
    pub pattern: &'static str,
    pub replacement: &'static str,
    pub anchor: Anchor,
    pub scope: RuleScope,
    pub family: RuleFamily,
}

impl fmt::Display for RewriteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}/{:?}/{:?} {:?} -> {:?}",
            self.family, self.scope, self.anchor, self.pattern, self.replacement
        )
    }
}

const fn rule(
    pattern: &'static str,
    replacement: &'static str,
    anchor: Anchor,
    scope: RuleScope,
    family: RuleFamily,
) -> RewriteRule {
    RewriteRule {
        pattern,
        replacement,
        anchor,
        scope,
        family,
    }
}

use Anchor::{Anywhere, End, Start, Whole};
use RuleFamily::{Abbreviation, Consolidation, Qualifier, RawQuirk, Tidy, TouchUp};
use RuleScope::{RawOnly, Shared};

/// The rewrite table, in application order.
pub static REWRITE_RULES: &[RewriteRule] = &[
    // Source quirks: parenthesised gust annotations, stray punctuation, plurals
    rule(r"\s*\([^)]*\)", "", Anywhere, RawOnly, RawQuirk),
    rule(r"[^A-Z0-9/\-. ]+", " ", Anywhere, RawOnly, RawQuirk),
    rule(
        r"\b(WIND|CURRENT|STORM|FLOOD|FIRE|SLIDE|SPOUT|TORNADO|CLOUD|SHOWER|SQUALL|WAVE|TIDE|SURGE|CHILL|SWELL|SEA|RAIN)E?S\b",
        "${1}",
        Anywhere,
        RawOnly,
        RawQuirk,
    ),
    // Abbreviations and recurring misspellings
    rule(
        r"\b(?:TSTMW?|THUNDERSTORMW|THUNDERTORM|THUNDERSTROM|THUNDEERSTORM|THUNERSTORM|TUNDERSTORM|THUDERSTORM|THUNDESTORM)\b",
        "THUNDERSTORM",
        Anywhere,
        Shared,
        Abbreviation,
    ),
    rule(r"\bFLD\b", "FLOOD", Anywhere, Shared, Abbreviation),
    rule(r"\bSML\b", "SMALL", Anywhere, Shared, Abbreviation),
    rule(r"\bCSTL\b", "COASTAL", Anywhere, Shared, Abbreviation),
    rule(r"\bWND\b", "WIND", Anywhere, Shared, Abbreviation),
    rule(r"\bHVY\b", "HEAVY", Anywhere, Shared, Abbreviation),
    rule(r"\bPRECIP\b", "PRECIPITATION", Anywhere, Shared, Abbreviation),
    rule(r"\bTEMPS?\b", "TEMPERATURE", Anywhere, Shared, Abbreviation),
    rule(r"\bWINTE?RY\b", "WINTER", Anywhere, Shared, Abbreviation),
    // Intensity and frequency qualifiers, whole words only
    rule(
        r"\b(?:RECORD|EXTREME|EXTREMELY|EXCESSIVE|SEVERE|UNSEASONABLY|UNSEASONABLE|UNSEASONAL|UNUSUALLY|UNUSUAL|ABNORMALLY|ABNORMAL|EXTENDED|PROLONGED|HEAVY|VERY|MINOR|MAJOR|SMALL|LIGHT|LOCAL|LOCALLY|ISOLATED|PATCHY|BITTER)\b",
        "",
        Anywhere,
        Shared,
        Qualifier,
    ),
    // Magnitudes trail the label; stripped once qualifiers after them are gone
    rule(
        r"(?:\s+G?[0-9][0-9.]*(?:\s*(?:MPH|KTS?|KNOTS|INCH(?:ES)?|IN))?)+\s*",
        "",
        End,
        RawOnly,
        RawQuirk,
    ),
    rule(r"\.+", " ", Anywhere, RawOnly, RawQuirk),
    // Whitespace and fragments left behind by removals
    rule(r"\s*/\s*", "/", Anywhere, Shared, Tidy),
    rule(r"/{2,}", "/", Anywhere, Shared, Tidy),
    rule(r"\s{2,}", " ", Anywhere, Shared, Tidy),
    rule(r"(?:[\s/\-]|AND\b)+", "", Start, Shared, Tidy),
    rule(r"(?:[\s/\-]|\bAND)+", "", End, Shared, Tidy),
    rule(r"\s+(?:DAMAGE|EVENTS?|ADVISORY|WARNING)", "", End, Shared, Tidy),
    // Event families collapse onto one representative phrase
    rule(r".*FLOOD.*", "FLOOD", Whole, Shared, Consolidation),
    rule(
        r"(?:URBAN|STREAM|HIGH WATER|RISING WATER)\b.*",
        "FLOOD",
        Whole,
        Shared,
        Consolidation,
    ),
    rule(
        r".*\b(?:STORM SURGE|COASTAL SURGE|COASTAL STORM|STORM TIDE|TIDAL SURGE)\b.*",
        "STORM SURGE/TIDE",
        Whole,
        Shared,
        Consolidation,
    ),
    rule(
        r"MARINE THUNDERSTORM\b.*",
        "MARINE THUNDERSTORM WIND",
        Whole,
        Shared,
        Consolidation,
    ),
    rule(
        r"THUNDERSTORMS?(?:\s+WIND)?(?:\W.*)?",
        "THUNDERSTORM WIND",
        Whole,
        Shared,
        Consolidation,
    ),
    rule(
        r"(?:DRY |WET )?MICROBURST.*|DOWNBURST.*|GUSTNADO.*",
        "THUNDERSTORM WIND",
        Whole,
        Shared,
        Consolidation,
    ),
    rule(r"(?:HURRICANE|TYPHOON)\b.*", "HURRICANE", Whole, Shared, Consolidation),
    rule(r"TROPICAL STORM\b.*", "TROPICAL STORM", Whole, Shared, Consolidation),
    rule(r"WINTER STORM\b.*", "WINTER STORM", Whole, Shared, Consolidation),
    rule(
        r"WINTER WEATHER\b.*|WINTER MIX|MIXED PRECIPITATION|FREEZING (?:RAIN|DRIZZLE)\b.*|GLAZE\b.*|(?:BLACK )?ICE|ICY ROADS?|ICE ON ROADS?|ICE ROADS|SNOW AND ICE|SNOW/ICE|ICE/SNOW|BLOWING SNOW",
        "WINTER WEATHER",
        Whole,
        Shared,
        Consolidation,
    ),
    rule(r"BLIZZARD\b.*", "BLIZZARD", Whole, Shared, Consolidation),
    rule(
        r"LAKE\s*-?\s*EFFECT SNOW\b.*",
        "LAKE-EFFECT SNOW",
        Whole,
        Shared,
        Consolidation,
    ),
    rule(
        r"(?:WILD|FOREST|BRUSH|GRASS)\s*(?:/\s*FOREST\s*)?FIRE.*",
        "WILDFIRE",
        Whole,
        Shared,
        Consolidation,
    ),
    rule(r"RIP CURRENT.*", "RIP CURRENT", Whole, Shared, Consolidation),
    rule(
        r"HEAT\s*WAVE.*|HOT\b.*|WARM\b.*|WARMTH|HYPERTHERMIA.*",
        "HEAT",
        Whole,
        Shared,
        Consolidation,
    ),
    rule(
        r"DROUGHT\b.*|DRY|DRYNESS|DRY (?:CONDITIONS|SPELL|WEATHER|PATTERN)",
        "DROUGHT",
        Whole,
        Shared,
        Consolidation,
    ),
    rule(
        r"COLD(?: WEATHER| TEMPERATURE| WAVE| SNAP| SPELL)?|WIND ?CHILL|LOW TEMPERATURE|HYPOTHERMIA.*|COLD AND WIND CHILL",
        "COLD",
        Whole,
        Shared,
        Consolidation,
    ),
    rule(
        r".*\b(?:FROST|FREEZE)\b.*",
        "FROST/FREEZE",
        Whole,
        Shared,
        Consolidation,
    ),
    rule(
        r"(?:LAND|MUD|ROCK)\s*SLIDE.*|LANDSLUMP.*",
        "DEBRIS FLOW",
        Whole,
        Shared,
        Consolidation,
    ),
    rule(r"FUNNEL(?: CLOUD)?\b.*", "FUNNEL CLOUD", Whole, Shared, Consolidation),
    rule(r"WATER\s*SPOUT.*", "WATERSPOUT", Whole, Shared, Consolidation),
    rule(r"TORNADO.*|LANDSPOUT", "TORNADO", Whole, Shared, Consolidation),
    rule(r"HAIL(?:STORM)?(?:\W.*)?", "HAIL", Whole, Shared, Consolidation),
    rule(
        r"(?:HIGH |ROUGH |HAZARDOUS )?SURF\b.*|(?:HIGH |ROUGH )?SEA|(?:HIGH )?SWELL",
        "HIGH SURF",
        Whole,
        Shared,
        Consolidation,
    ),
    rule(r"HIGH WIND.*", "HIGH WIND", Whole, Shared, Consolidation),
    rule(
        r"(?:GUSTY|GRADIENT) WIND.*|NON[\s-]?THUNDERSTORM WIND",
        "STRONG WIND",
        Whole,
        Shared,
        Consolidation,
    ),
    rule(
        r"RAIN(?:S|FALL|STORM)?|PRECIPITATION|SHOWER",
        "RAIN",
        Whole,
        Shared,
        Consolidation,
    ),
    rule(
        r"SNOW(?:FALL|STORM| SQUALL| SHOWER)?",
        "SNOW",
        Whole,
        Shared,
        Consolidation,
    ),
    rule(r"BLOWING DUST|DUST STORM.*", "DUST STORM", Whole, Shared, Consolidation),
    rule(r"VOLCANIC\b.*", "VOLCANIC ASH", Whole, Shared, Consolidation),
    rule(r"SMOKE\b.*", "DENSE SMOKE", Whole, Shared, Consolidation),
    rule(r"AVALANCHE.*", "AVALANCHE", Whole, Shared, Consolidation),
    rule(r"LIGHTNING\b.*", "LIGHTNING", Whole, Shared, Consolidation),
    // Bare words left after removal map to their official phrase
    rule("COLD", "COLD/WIND CHILL", Whole, Shared, TouchUp),
    rule("WIND", "STRONG WIND", Whole, Shared, TouchUp),
    rule("FOG", "DENSE FOG", Whole, Shared, TouchUp),
    rule("ICE FOG", "FREEZING FOG", Whole, Shared, TouchUp),
    rule(r"\s+", "", Start, Shared, Tidy),
    rule(r"\s+", "", End, Shared, Tidy),
];

/// A rewrite rule with its pattern compiled
#[derive(Debug)]
pub struct CompiledRule {
    pub rule: &'static RewriteRule,
    regex: Regex,
}

impl CompiledRule {
    fn compile(rule: &'static RewriteRule) -> Self {
        let anchored = rule.anchor.wrap(rule.pattern);
        let regex = Regex::new(&anchored)
            .unwrap_or_else(|e| panic!("invalid rewrite pattern {:?}: {}", rule.pattern, e));
        Self { rule, regex }
    }

    /// Apply this rule once; borrowed output means the rule did not fire.
    pub fn rewrite<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.regex.replace_all(text, self.rule.replacement)
    }
}

static RAW_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| {
    REWRITE_RULES
        .iter()
        .map(CompiledRule::compile)
        .collect()
});

static TAXONOMY_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| {
    REWRITE_RULES
        .iter()
        .filter(|rule| rule.scope == RuleScope::Shared)
        .map(CompiledRule::compile)
        .collect()
});

/// Run `rules` once, in order, over the uppercased `text`.
pub fn apply_rules(text: &str, rules: &[CompiledRule]) -> String {
    let mut current = text.to_uppercase();
    for compiled in rules {
        let rewritten = match compiled.rewrite(&current) {
            Cow::Owned(rewritten) => rewritten,
            Cow::Borrowed(_) => continue,
        };
        current = rewritten;
    }
    current
}

/// One rule firing recorded by [`RuleSet::trace`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewriteStep {
    pub pass: usize,
    pub rule: &'static RewriteRule,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewriteTrace {
    pub input: String,
    pub output: String,
    pub steps: Vec<RewriteStep>,
}

/// Which view of the rewrite table to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleView {
    Raw,
    Taxonomy,
}

/// A view of the rewrite table for one side of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSet {
    view: RuleView,
}

impl RuleSet {
    /// Every rule; used on categories read from the source file.
    pub fn raw() -> Self {
        Self { view: RuleView::Raw }
    }

    /// Shared rules only; used on the official taxonomy.
    pub fn taxonomy() -> Self {
        Self {
            view: RuleView::Taxonomy,
        }
    }

    pub fn compiled(&self) -> &'static [CompiledRule] {
        match self.view {
            RuleView::Raw => RAW_RULES.as_slice(),
            RuleView::Taxonomy => TAXONOMY_RULES.as_slice(),
        }
    }

    pub fn rules(&self) -> impl Iterator<Item = &'static RewriteRule> {
        self.compiled().iter().map(|compiled| compiled.rule)
    }

    /// A single pass over the table.
    pub fn apply(&self, text: &str) -> String {
        apply_rules(text, self.compiled())
    }

    /// Repeat passes until the text stops changing, so that
    /// `normalize(normalize(s)) == normalize(s)` holds for any input.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = self.apply(text);
        for _ in 1..MAX_PASSES {
            let next = self.apply(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    /// Same result as [`RuleSet::normalize`], recording each rule that fired.
    pub fn trace(&self, text: &str) -> RewriteTrace {
        let mut steps = Vec::new();
        let mut current = text.to_uppercase();

        for pass in 1..=MAX_PASSES {
            let start = current.clone();
            for compiled in self.compiled() {
                let rewritten = match compiled.rewrite(&current) {
                    Cow::Owned(rewritten) => rewritten,
                    Cow::Borrowed(_) => continue,
                };
                if rewritten != current {
                    steps.push(RewriteStep {
                        pass,
                        rule: compiled.rule,
                        before: current.clone(),
                        after: rewritten.clone(),
                    });
                }
                current = rewritten;
            }
            if current == start {
                break;
            }
        }

        RewriteTrace {
            input: text.to_string(),
            output: current,
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REALISTIC_LABELS: &[&str] = &[
        "TSTM WIND",
        "TSTM WIND (G45)",
        "TSTM WIND 55",
        "THUNDERSTORM WINDS.",
        "MARINE TSTM WIND",
        "URBAN/SML STREAM FLD",
        "FLASH FLOODING",
        "FLOOD/FLASH FLOOD",
        "Ice jam flood (minor",
        "RECORD COLD",
        "EXTREME WINDCHILL",
        "RECORD/EXCESSIVE RAINFALL",
        "HEAVY RAINS",
        "HAIL 0.75",
        "HAIL 1.75)",
        "WILD/FOREST FIRE",
        "HURRICANE OPAL",
        "RIP CURRENTS/HEAVY SURF",
        "WINTER WEATHER/MIX",
        "NON-TSTM WIND",
        "Heavy Rain/Severe Weather",
        "LIGNTNING",
        "WIND 75 RECORD",
        "AND /RAINFALL",
        "OTHER",
    ];

    #[test]
    fn test_every_pattern_compiles() {
        assert_eq!(RAW_RULES.len(), REWRITE_RULES.len());
        assert!(TAXONOMY_RULES.len() < RAW_RULES.len());
        assert!(TAXONOMY_RULES
            .iter()
            .all(|compiled| compiled.rule.scope == RuleScope::Shared));
    }

    #[test]
    fn test_abbreviation_expansion() {
        assert_eq!(RuleSet::raw().normalize("TSTM WIND"), "THUNDERSTORM WIND");
        assert_eq!(
            RuleSet::raw().normalize("MARINE TSTM WIND"),
            "MARINE THUNDERSTORM WIND"
        );
        assert_eq!(RuleSet::raw().normalize("URBAN/SML STREAM FLD"), "FLOOD");
    }

    #[test]
    fn test_qualifier_removal_is_whole_word() {
        // LIGHT is a qualifier, LIGHTNING is an event
        assert_eq!(RuleSet::raw().normalize("LIGHTNING"), "LIGHTNING");
        assert_eq!(RuleSet::raw().normalize("LIGHT SNOW"), "SNOW");
        assert_eq!(RuleSet::raw().normalize("RECORDS"), "RECORDS");
        assert_eq!(RuleSet::raw().normalize("SEVERE THUNDERSTORMS"), "THUNDERSTORM WIND");
    }

    #[test]
    fn test_consolidation_and_touch_ups() {
        let rules = RuleSet::raw();
        assert_eq!(rules.normalize("FLASH FLOODING"), "FLOOD");
        assert_eq!(rules.normalize("COASTAL FLOOD"), "FLOOD");
        assert_eq!(rules.normalize("STORM SURGE"), "STORM SURGE/TIDE");
        assert_eq!(rules.normalize("COASTAL STORM"), "STORM SURGE/TIDE");
        assert_eq!(rules.normalize("RECORD COLD"), "COLD/WIND CHILL");
        assert_eq!(rules.normalize("FOG"), "DENSE FOG");
        assert_eq!(rules.normalize("WIND"), "STRONG WIND");
        assert_eq!(rules.normalize("HEAT WAVE"), "HEAT");
    }

    #[test]
    fn test_raw_quirks_only_apply_to_raw_side() {
        assert_eq!(RuleSet::raw().normalize("HIGH WINDS (G40)"), "HIGH WIND");
        // Without the raw-only plural rule the taxonomy view leaves the S in place
        assert_eq!(RuleSet::taxonomy().normalize("DUST DEVILS"), "DUST DEVILS");
    }

    #[test]
    fn test_single_pass_is_idempotent_on_realistic_labels() {
        let rules = RuleSet::raw();
        for label in REALISTIC_LABELS {
            let once = rules.apply(label);
            assert_eq!(rules.apply(&once), once, "rule table not settled for {:?}", label);
        }
    }

    #[test]
    fn test_normalize_is_idempotent_on_odd_input() {
        let rules = RuleSet::raw();
        for label in ["WIND S AND DAMAGE", "/ AND RECORD / HEAT 12", "AND", "", "  ", "(G45)"] {
            let once = rules.normalize(label);
            assert_eq!(rules.normalize(&once), once, "not idempotent for {:?}", label);
        }
    }

    #[test]
    fn test_trace_matches_normalize() {
        let rules = RuleSet::raw();
        let trace = rules.trace("Tstm Wind (G45)");
        assert_eq!(trace.output, rules.normalize("Tstm Wind (G45)"));
        assert_eq!(trace.output, "THUNDERSTORM WIND");
        assert!(trace
            .steps
            .iter()
            .any(|step| step.rule.family == RuleFamily::Abbreviation));
    }
}

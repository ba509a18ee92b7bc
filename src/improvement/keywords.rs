use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::improvement::ImprovementType;

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("static regex must compile"));
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("static regex must compile"));

// Shared by proposal matching and EPC recommendation lookup. Phrases are
// stored pre-normalised.
static KEYWORDS: Lazy<HashMap<&'static str, Vec<String>>> = Lazy::new(|| {
    let raw: [(&str, &[&str]); 8] = [
        (
            "solar",
            &[
                "solar",
                "photovoltaic",
                "pv panel",
                "solar panel",
                "solar pv",
                "solar array",
                "solar thermal",
            ],
        ),
        (
            "insulation",
            &[
                "insulation",
                "wall insulation",
                "external wall",
                "cavity wall",
                "loft insulation",
                "internal wall insulation",
                "underfloor insulation",
            ],
        ),
        (
            "windows",
            &[
                "window",
                "double glaz",
                "triple glaz",
                "glazing",
                "secondary glazing",
                "upvc",
                "sash",
            ],
        ),
        (
            "heat_pump",
            &[
                "heat pump",
                "air source",
                "ground source",
                "ashp",
                "gshp",
                "air to water",
            ],
        ),
        (
            "battery",
            &[
                "battery",
                "battery storage",
                "energy storage",
                "powerwall",
                "home battery",
            ],
        ),
        (
            "loft_conversion",
            &[
                "loft conversion",
                "dormer",
                "roof extension",
                "rooflight",
                "velux",
                "mansard",
            ],
        ),
        (
            "cladding",
            &[
                "cladding",
                "external render",
                "insulated render",
                "external wall insulation",
                "timber cladding",
            ],
        ),
        (
            "ev_charger",
            &[
                "ev charger",
                "electric vehicle",
                "charging point",
                "car charger",
                "ev charging",
                "charge point",
            ],
        ),
    ];
    raw.into_iter()
        .map(|(key, phrases)| {
            let normalized = phrases.iter().map(|p| normalize_text(p)).collect();
            (key, normalized)
        })
        .collect()
});

/// Lowercases, replaces punctuation with spaces and collapses whitespace.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

pub fn keywords_for(improvement: &ImprovementType) -> Vec<String> {
    match KEYWORDS.get(improvement.as_slug()) {
        Some(phrases) => phrases.clone(),
        None => {
            let literal = normalize_text(improvement.as_slug());
            if literal.is_empty() {
                Vec::new()
            } else {
                vec![literal]
            }
        }
    }
}

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::improvement::{keywords_for, normalize_text, ImprovementType};
use crate::matching::fuzzy::partial_ratio;
use crate::types::PlanningApplication;

pub const DEFAULT_FUZZY_THRESHOLD: u8 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchOptions {
    pub fuzzy: bool,
    pub threshold: u8,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            fuzzy: true,
            threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

/// Returns the applications whose proposal text refers to `improvement`,
/// preserving input order.
pub fn match_applications<'a>(
    applications: &'a [PlanningApplication],
    improvement: &ImprovementType,
    options: MatchOptions,
) -> Vec<&'a PlanningApplication> {
    let keywords = keywords_for(improvement);
    let matched: Vec<&PlanningApplication> = applications
        .iter()
        .filter(|app| proposal_matches(&app.proposal, &keywords, options))
        .collect();
    debug!(
        improvement = %improvement,
        candidates = applications.len(),
        matched = matched.len(),
        "matched planning precedent"
    );
    matched
}

pub fn proposal_matches(proposal: &str, keywords: &[String], options: MatchOptions) -> bool {
    let normalized = normalize_text(proposal);
    if normalized.is_empty() {
        return false;
    }
    if keywords.iter().any(|k| normalized.contains(k.as_str())) {
        return true;
    }
    if !options.fuzzy {
        return false;
    }
    let threshold = f64::from(options.threshold);
    keywords
        .iter()
        .any(|k| partial_ratio(k, &normalized) >= threshold)
}

#[cfg(test)]
mod tests {
    use super::{match_applications, MatchOptions};
    use crate::improvement::ImprovementType;
    use crate::types::PlanningApplication;

    fn sample() -> Vec<PlanningApplication> {
        vec![
            PlanningApplication::new("A/1", "Installation of air-source heat pump to rear"),
            PlanningApplication::new("A/2", "Single storey rear extension"),
            PlanningApplication::new("A/3", "Solar PV panels on south roof slope"),
            PlanningApplication::new("A/4", ""),
            PlanningApplication::new("A/5", "Replacement of timber windows with double glazed units"),
            PlanningApplication::new("A/6", "Erection of photovoltiac array"),
        ]
    }

    #[test]
    fn matches_by_keyword_in_input_order() {
        let apps = sample();
        let solar = match_applications(&apps, &ImprovementType::Solar, MatchOptions::default());
        let refs: Vec<_> = solar
            .iter()
            .map(|a| a.planning_reference.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(refs, vec!["A/3", "A/6"]);
    }

    #[test]
    fn fuzzy_can_be_disabled() {
        let apps = sample();
        let options = MatchOptions {
            fuzzy: false,
            threshold: 85,
        };
        let solar = match_applications(&apps, &ImprovementType::Solar, options);
        assert_eq!(solar.len(), 1);
    }

    #[test]
    fn empty_proposal_never_matches() {
        let apps = vec![PlanningApplication::new("E/1", "  ... ")];
        for improvement in ImprovementType::KNOWN {
            assert!(match_applications(&apps, &improvement, MatchOptions::default()).is_empty());
        }
    }

    #[test]
    fn unknown_type_matches_its_literal_name() {
        let apps = vec![
            PlanningApplication::new("G/1", "Green roof over garage"),
            PlanningApplication::new("G/2", "Rear dormer"),
        ];
        let matched = match_applications(
            &apps,
            &ImprovementType::parse("green roof"),
            MatchOptions::default(),
        );
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].planning_reference.as_deref(), Some("G/1"));
    }

    #[test]
    fn matching_is_idempotent() {
        let apps = sample();
        let first = match_applications(&apps, &ImprovementType::Windows, MatchOptions::default());
        let second = match_applications(&apps, &ImprovementType::Windows, MatchOptions::default());
        assert_eq!(first, second);
    }

    #[test]
    fn cladding_ignores_words_that_merely_contain_its_terms() {
        let apps = vec![
            PlanningApplication::new("C/1", "Surrender of lease at 12 Newington Green"),
            PlanningApplication::new("C/2", "Change of use of shop, 4 Newington Butts"),
            PlanningApplication::new("C/3", "External render and cladding to flank wall"),
        ];
        let cladding = match_applications(
            &apps,
            &ImprovementType::parse("cladding"),
            MatchOptions::default(),
        );
        assert_eq!(cladding.len(), 1);
        assert_eq!(cladding[0].planning_reference.as_deref(), Some("C/3"));
    }
}

use serde::{Deserialize, Serialize};

use crate::improvement::{keywords_for, normalize_text, EpcBand, ImprovementType};
use crate::output::format_gbp;
use crate::types::{EpcRecommendation, ValueSource};

pub const NATIONAL_AVERAGE_PROPERTY_VALUE: f64 = 285_000.0;
const NO_UPLIFT_COST_SHARE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandSource {
    OfficialRecommendation,
    StaticEstimate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueEstimate {
    pub value_increase: f64,
    pub target_band: EpcBand,
    pub band_source: BandSource,
    pub value_source: ValueSource,
    pub explanation: String,
}

/// Market premium of a band relative to band D.
pub fn green_premium(band: EpcBand) -> f64 {
    match band {
        EpcBand::A => 0.14,
        EpcBand::B => 0.10,
        EpcBand::C => 0.06,
        EpcBand::D => 0.0,
        EpcBand::E => -0.04,
        EpcBand::F => -0.08,
        EpcBand::G => -0.12,
    }
}

/// Bands gained when no certificate recommendation applies.
pub fn expected_band_jump(improvement: &ImprovementType) -> u8 {
    match improvement {
        ImprovementType::Insulation | ImprovementType::HeatPump => 2,
        _ => 1,
    }
}

pub fn estimate_value_increase(
    improvement: &ImprovementType,
    estimated_cost: f64,
    current: EpcBand,
    property_value: Option<f64>,
    recommendations: &[EpcRecommendation],
    fallback_value: f64,
) -> ValueEstimate {
    let (target_band, band_source, band_note) =
        match recommended_band(improvement, current, recommendations) {
            Some((band, item)) => (
                band,
                BandSource::OfficialRecommendation,
                format!("official EPC recommendation \"{item}\""),
            ),
            None => {
                let jump = expected_band_jump(improvement);
                let target = EpcBand::from_numeric(current.numeric().saturating_sub(jump));
                (
                    target,
                    BandSource::StaticEstimate,
                    format!("static estimate of {jump} band(s) for {improvement}"),
                )
            }
        };

    let (base_value, value_source) = match property_value.filter(|v| v.is_finite() && *v > 0.0) {
        Some(value) => (value, ValueSource::LandRegistry),
        None => (fallback_value, ValueSource::NationalAverage),
    };
    let value_note = match value_source {
        ValueSource::LandRegistry => format!("Land Registry value of {}", format_gbp(base_value)),
        ValueSource::NationalAverage => {
            format!("national average value of {} (no local sales found)", format_gbp(base_value))
        }
    };

    let uplift = green_premium(target_band) - green_premium(current);
    let mut value_increase = base_value * uplift;
    let explanation = if value_increase <= 0.0 {
        value_increase = estimated_cost * NO_UPLIFT_COST_SHARE;
        format!(
            "EPC {current} already at or above the premium for band {target_band} ({band_note}); \
             value uplift floored at 50% of installation cost using {value_note}."
        )
    } else {
        format!(
            "EPC {current} -> {target_band} via {band_note}; {:.1}% green premium on {value_note}.",
            uplift * 100.0
        )
    };

    ValueEstimate {
        value_increase,
        target_band,
        band_source,
        value_source,
        explanation,
    }
}

fn recommended_band(
    improvement: &ImprovementType,
    current: EpcBand,
    recommendations: &[EpcRecommendation],
) -> Option<(EpcBand, String)> {
    let keywords = keywords_for(improvement);
    recommendations.iter().find_map(|rec| {
        let text = normalize_text(&rec.improvement_item);
        if !keywords.iter().any(|k| text.contains(k.as_str())) {
            return None;
        }
        let band = rec.potential_band?;
        band.is_better_than(current)
            .then(|| (band, rec.improvement_item.clone()))
    })
}

pub fn roi_percent(cost: f64, value_increase: f64) -> f64 {
    if cost == 0.0 {
        return 0.0;
    }
    (value_increase - cost) / cost * 100.0
}

#[cfg(test)]
mod tests {
    use super::{
        estimate_value_increase, roi_percent, BandSource, NATIONAL_AVERAGE_PROPERTY_VALUE,
    };
    use crate::improvement::{EpcBand, ImprovementType};
    use crate::types::{EpcRecommendation, ValueSource};

    fn recommendation(text: &str, band: Option<EpcBand>) -> EpcRecommendation {
        EpcRecommendation {
            improvement_item: text.to_string(),
            potential_band: band,
            indicative_cost: None,
        }
    }

    #[test]
    fn static_jump_with_real_property_value() {
        let estimate = estimate_value_increase(
            &ImprovementType::Insulation,
            9_900.0,
            EpcBand::D,
            Some(400_000.0),
            &[],
            NATIONAL_AVERAGE_PROPERTY_VALUE,
        );
        assert_eq!(estimate.target_band, EpcBand::B);
        assert_eq!(estimate.band_source, BandSource::StaticEstimate);
        assert_eq!(estimate.value_source, ValueSource::LandRegistry);
        assert!((estimate.value_increase - 40_000.0).abs() < 1e-6);
        assert!(estimate.explanation.contains("static estimate"));
        assert!(estimate.explanation.contains("Land Registry value of £400,000.00"));
    }

    #[test]
    fn national_average_fallback_is_disclosed() {
        let estimate = estimate_value_increase(
            &ImprovementType::Solar,
            7_650.0,
            EpcBand::E,
            None,
            &[],
            NATIONAL_AVERAGE_PROPERTY_VALUE,
        );
        assert_eq!(estimate.target_band, EpcBand::D);
        assert_eq!(estimate.value_source, ValueSource::NationalAverage);
        assert!((estimate.value_increase - 285_000.0 * 0.04).abs() < 1e-6);
        assert!(estimate.explanation.contains("national average"));
    }

    #[test]
    fn official_recommendation_sets_target_band() {
        let recs = vec![
            recommendation("Low energy lighting", Some(EpcBand::C)),
            recommendation("Solar photovoltaic panels, 2.5 kWp", Some(EpcBand::D)),
            recommendation("Solar water heating", Some(EpcBand::B)),
        ];
        let estimate = estimate_value_increase(
            &ImprovementType::Solar,
            7_650.0,
            EpcBand::D,
            Some(300_000.0),
            &recs,
            NATIONAL_AVERAGE_PROPERTY_VALUE,
        );
        assert_eq!(estimate.band_source, BandSource::OfficialRecommendation);
        assert_eq!(estimate.target_band, EpcBand::B);
        assert!((estimate.value_increase - 30_000.0).abs() < 1e-6);
        assert!(estimate.explanation.contains("official EPC recommendation"));
    }

    #[test]
    fn no_uplift_is_floored_at_half_the_cost() {
        let estimate = estimate_value_increase(
            &ImprovementType::Windows,
            5_850.0,
            EpcBand::A,
            Some(500_000.0),
            &[],
            NATIONAL_AVERAGE_PROPERTY_VALUE,
        );
        assert_eq!(estimate.target_band, EpcBand::A);
        assert_eq!(estimate.value_increase, 2_925.0);
        assert!(estimate.explanation.contains("floored at 50%"));
        assert!(estimate.explanation.contains("Land Registry"));
    }

    #[test]
    fn roi_handles_zero_cost() {
        assert_eq!(roi_percent(0.0, 10_000.0), 0.0);
        assert!((roi_percent(10_000.0, 15_000.0) - 50.0).abs() < 1e-9);
        assert!((roi_percent(8_000.0, 2_000.0) + 75.0).abs() < 1e-9);
    }
}

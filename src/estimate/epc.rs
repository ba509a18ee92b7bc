use crate::improvement::{EpcBand, ImprovementType};

const COMPLIANCE_BAND: EpcBand = EpcBand::C;

/// Signed change to the numeric band; negative improves the rating.
pub fn band_delta(improvement: &ImprovementType) -> f64 {
    match improvement {
        ImprovementType::Insulation => -1.0,
        ImprovementType::HeatPump => -2.0,
        ImprovementType::Solar => -1.0,
        ImprovementType::Windows => -1.0,
        ImprovementType::EvCharger => -0.5,
        ImprovementType::Battery => -0.3,
        ImprovementType::Cladding => -1.0,
        ImprovementType::LoftConversion => -0.5,
        ImprovementType::Other(_) => 0.0,
    }
}

/// Projects the band after applying every improvement cumulatively.
pub fn project_band(current: EpcBand, improvements: &[ImprovementType]) -> EpcBand {
    let mut numeric = f64::from(current.numeric());
    for improvement in improvements {
        numeric += band_delta(improvement);
    }
    let clamped = numeric.clamp(f64::from(EpcBand::BEST), f64::from(EpcBand::WORST));
    EpcBand::from_numeric(clamped.round_ties_even() as u8)
}

pub fn is_compliant(band: EpcBand) -> bool {
    band.numeric() <= COMPLIANCE_BAND.numeric()
}

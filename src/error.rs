use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("could not resolve a location for {reference}; supply coordinates, a UK postcode or an address")]
    UnresolvableLocation { reference: String },
    #[error("invalid analysis request: {0}")]
    InvalidRequest(String),
}

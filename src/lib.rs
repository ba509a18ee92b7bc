pub mod analysis;
pub mod config;
pub mod error;
pub mod estimate;
pub mod improvement;
pub mod matching;
pub mod output;
pub mod providers;
pub mod types;

pub mod fuzzy;
pub mod matcher;
pub mod precedent;

pub use matcher::{match_applications, MatchOptions};
pub use precedent::{average_decision_days, top_examples, PrecedentExample};

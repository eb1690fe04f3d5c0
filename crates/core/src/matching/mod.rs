pub mod engine;
pub mod synonyms;

pub use engine::{match_requirements, MatchResult, RequirementMatch};

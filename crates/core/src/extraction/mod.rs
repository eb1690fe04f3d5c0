pub mod extractor;
pub mod segmenter;

pub use extractor::{
    extract, RequirementCategory, RequirementItem, RequirementSet, Seniority,
};

//! Candidate skill profile — a read-only snapshot supplied by the external
//! profile-builder collaborator.
//!
//! The snapshot is passed by reference through an entire matching→planning
//! run; the core never mutates it and holds no profile state between runs,
//! which is what keeps scoring deterministic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::matching::synonyms::normalize_name;

/// One skill the candidate can evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    /// Self-assessed or builder-derived proficiency, 0.0–1.0.
    pub proficiency: f32,
    /// Months since the skill was last exercised.
    pub recency_months: u32,
    /// Ids of the source documents/entries evidencing this skill.
    pub evidence_source_ids: Vec<Uuid>,
}

/// Immutable snapshot of the candidate's skills, keyed by normalized name.
///
/// `BTreeMap` keeps iteration order deterministic across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillProfile {
    pub captured_at: DateTime<Utc>,
    pub skills: BTreeMap<String, SkillEntry>,
}

impl SkillProfile {
    pub fn new(captured_at: DateTime<Utc>) -> Self {
        Self {
            captured_at,
            skills: BTreeMap::new(),
        }
    }

    /// Inserts an entry under its normalized name.
    pub fn insert(&mut self, entry: SkillEntry) {
        self.skills.insert(normalize_name(&entry.name), entry);
    }

    /// Validates the snapshot shape required by the matching engine.
    ///
    /// Checks: non-empty names, keys normalized, proficiency finite and in
    /// [0,1]. A snapshot failing these is rejected up front with
    /// `MatchingInput` rather than producing a partial result.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (key, entry) in &self.skills {
            if entry.name.trim().is_empty() {
                return Err(CoreError::MatchingInput(
                    "skill entry with empty name".to_string(),
                ));
            }
            if key != &normalize_name(&entry.name) {
                return Err(CoreError::MatchingInput(format!(
                    "key '{key}' is not the normalized form of '{}'",
                    entry.name
                )));
            }
            if !entry.proficiency.is_finite()
                || !(0.0..=1.0).contains(&entry.proficiency)
            {
                return Err(CoreError::MatchingInput(format!(
                    "skill '{}' has proficiency {} outside [0,1]",
                    entry.name, entry.proficiency
                )));
            }
        }
        Ok(())
    }
}

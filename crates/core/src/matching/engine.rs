//! Matching Engine — scores a `RequirementSet` against a `SkillProfile`.
//!
//! Resolution per skill/qualification requirement: exact normalized-name
//! lookup, then the synonym table, then fuzzy token overlap above the
//! policy threshold. Confidence for a resolved match is
//! `proficiency × recency_decay`, the overall score a weight-averaged sum
//! with a multiplicative penalty per unmet mandatory requirement.
//!
//! Deterministic by construction: ordered iteration only, no randomness,
//! no external calls. Identical inputs yield bit-identical results.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MatchPolicy;
use crate::errors::CoreError;
use crate::extraction::{RequirementCategory, RequirementItem, RequirementSet};
use crate::matching::synonyms::{contains_word, jaccard, normalize_name, tokenize, variants_of};
use crate::models::profile::SkillProfile;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Outcome for a single requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementMatch {
    pub requirement: RequirementItem,
    /// Normalized profile key of the resolved skill, if any.
    pub matched_skill: Option<String>,
    pub confidence: f32,
    pub gap: bool,
}

/// Full scoring output for one (RequirementSet, SkillProfile) pair.
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub overall_score: f32,
    pub per_requirement: Vec<RequirementMatch>,
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Scores `requirements` against a read-only `profile` snapshot.
///
/// An empty requirement set yields `overall_score = 0.0` (vacuous zero, not
/// an error). A malformed profile snapshot fails with
/// `CoreError::MatchingInput` before any scoring happens.
pub fn match_requirements(
    requirements: &RequirementSet,
    profile: &SkillProfile,
    policy: &MatchPolicy,
) -> Result<MatchResult, CoreError> {
    profile.validate()?;

    if requirements.items.is_empty() {
        return Ok(MatchResult {
            overall_score: 0.0,
            per_requirement: Vec::new(),
        });
    }

    let mut per_requirement = Vec::with_capacity(requirements.items.len());
    let mut weighted_sum = 0.0_f32;
    let mut weight_total = 0.0_f32;
    let mut mandatory_gaps = 0u32;

    for item in &requirements.items {
        let outcome = match item.category {
            RequirementCategory::Skill | RequirementCategory::Qualification => {
                score_skill_requirement(item, profile, policy)
            }
            RequirementCategory::ExperienceLevel => {
                score_experience_requirement(item, profile, policy)
            }
            // Culture signals carry no skill evidence; they are reported but
            // excluded from the weighted average and never counted as gaps.
            RequirementCategory::CultureSignal => (None, 0.0, false),
        };
        let (matched_skill, confidence, gap) = outcome;

        if item.category != RequirementCategory::CultureSignal {
            weighted_sum += item.weight * confidence;
            weight_total += item.weight;
        }
        if gap && item.is_mandatory {
            mandatory_gaps += 1;
        }

        per_requirement.push(RequirementMatch {
            requirement: item.clone(),
            matched_skill,
            confidence,
            gap,
        });
    }

    let mut overall = if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        0.0
    };
    // Each unmet mandatory requirement suppresses the score multiplicatively
    // so it cannot be averaged away by strong optional matches.
    for _ in 0..mandatory_gaps {
        overall *= 1.0 - policy.mandatory_gap_penalty;
    }
    let overall_score = overall.clamp(0.0, 1.0);

    debug!(
        overall_score,
        requirements = per_requirement.len(),
        mandatory_gaps,
        "matched requirement set against profile"
    );

    Ok(MatchResult {
        overall_score,
        per_requirement,
    })
}

/// Resolves one skill/qualification requirement against the profile.
/// Returns `(matched_skill, confidence, gap)`.
fn score_skill_requirement(
    item: &RequirementItem,
    profile: &SkillProfile,
    policy: &MatchPolicy,
) -> (Option<String>, f32, bool) {
    let normalized = normalize_name(&item.text);

    // Exact: the whole requirement text is a skill name.
    if let Some(entry) = profile.skills.get(&normalized) {
        return (
            Some(normalized),
            effective_strength(entry.proficiency, entry.recency_months, policy),
            false,
        );
    }

    // Synonym/mention: a profile skill (or one of its known variants)
    // appears word-bounded inside the requirement phrase. Longest variant
    // wins; BTreeMap order breaks remaining ties deterministically.
    let mut best: Option<(usize, &str)> = None;
    for key in profile.skills.keys() {
        for variant in variants_of(key) {
            if contains_word(&normalized, &variant) {
                let better = match best {
                    Some((len, _)) => variant.len() > len,
                    None => true,
                };
                if better {
                    best = Some((variant.len(), key.as_str()));
                }
            }
        }
    }
    if let Some((_, key)) = best {
        let entry = &profile.skills[key];
        return (
            Some(key.to_string()),
            effective_strength(entry.proficiency, entry.recency_months, policy),
            false,
        );
    }

    // Fuzzy: token overlap between the phrase and the skill name.
    let phrase_tokens = tokenize(&item.text);
    let mut best_fuzzy: Option<(f32, &str)> = None;
    for key in profile.skills.keys() {
        let sim = jaccard(&phrase_tokens, &tokenize(key));
        let better = match best_fuzzy {
            Some((s, _)) => sim > s,
            None => sim >= policy.fuzzy_threshold,
        };
        if better && sim >= policy.fuzzy_threshold {
            best_fuzzy = Some((sim, key.as_str()));
        }
    }
    if let Some((sim, key)) = best_fuzzy {
        let entry = &profile.skills[key];
        let strength = effective_strength(entry.proficiency, entry.recency_months, policy);
        // Fuzzy matches are discounted by their similarity.
        return (Some(key.to_string()), (strength * sim).clamp(0.0, 1.0), false);
    }

    (None, 0.0, true)
}

/// Experience-level requirements often name the skill they quantify
/// ("5+ years of Rust"), so skill resolution is tried first. Without a
/// named skill, the profile's strongest effective strength stands in as a
/// proxy for depth of experience. Empty profile → gap.
fn score_experience_requirement(
    item: &RequirementItem,
    profile: &SkillProfile,
    policy: &MatchPolicy,
) -> (Option<String>, f32, bool) {
    let resolved = score_skill_requirement(item, profile, policy);
    if !resolved.2 {
        return resolved;
    }
    let best = profile
        .skills
        .values()
        .map(|e| effective_strength(e.proficiency, e.recency_months, policy))
        .fold(None::<f32>, |acc, s| Some(acc.map_or(s, |a| a.max(s))));
    match best {
        Some(strength) => (None, strength, false),
        None => (None, 0.0, true),
    }
}

fn effective_strength(proficiency: f32, recency_months: u32, policy: &MatchPolicy) -> f32 {
    (proficiency * policy.recency.decay(recency_months)).clamp(0.0, 1.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

//! Requirement Extractor — turns raw job-posting text into a structured
//! `RequirementSet`.
//!
//! Classification is rule-based and lexical: keyword sets decide category
//! and modal strength, phrase position decides the base weight, explicit
//! year-of-experience mentions and title keywords decide seniority. Low
//! signal degrades to low-weight items; only genuinely non-text input is
//! an error.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::CoreError;
use crate::extraction::segmenter::{segment, Phrase};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Category of an extracted requirement. Downstream consumers pattern-match
/// exhaustively on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementCategory {
    Skill,
    Qualification,
    ExperienceLevel,
    CultureSignal,
}

/// A single requirement phrase with extracted importance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementItem {
    pub text: String,
    pub category: RequirementCategory,
    /// Extracted importance, 0.0–1.0, from phrase position and modal strength.
    pub weight: f32,
    pub is_mandatory: bool,
}

/// Seniority level aggregated from the posting. `Unknown` when there is no
/// signal — never guessed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
    Junior,
    Mid,
    Senior,
    Lead,
    #[default]
    Unknown,
}

/// Structured view of a posting's requirements. Built once, immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementSet {
    pub items: Vec<RequirementItem>,
    pub seniority: Seniority,
    pub culture_tags: BTreeSet<String>,
}

impl RequirementSet {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            seniority: Seniority::Unknown,
            culture_tags: BTreeSet::new(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lexicons
// ────────────────────────────────────────────────────────────────────────────

const MANDATORY_MARKERS: &[&str] = &["must", "required", "require", "essential", "need to have"];

const NICE_TO_HAVE_MARKERS: &[&str] = &["nice to have", "bonus", "a plus", "preferred", "plus:"];

const QUALIFICATION_MARKERS: &[&str] = &[
    "degree",
    "bachelor",
    "master",
    "phd",
    "b.s",
    "m.s",
    "bsc",
    "msc",
    "certification",
    "certified",
    "diploma",
];

const TITLE_MARKERS: &[&str] = &[
    "senior", "sr.", "junior", "entry level", "intern", "lead", "principal", "staff",
];

const CULTURE_MARKERS: &[&str] = &[
    "team",
    "culture",
    "collaborat",
    "fast-paced",
    "values",
    "passion",
    "mission",
    "diverse",
    "inclusive",
    "remote",
    "hybrid",
    "ownership",
    "startup",
    "work-life",
    "mentorship",
    "autonomy",
];

/// Culture markers that double as reportable culture tags.
const CULTURE_TAGS: &[&str] = &[
    "remote",
    "hybrid",
    "fast-paced",
    "collaborative",
    "ownership",
    "startup",
    "mission-driven",
    "inclusive",
    "mentorship",
    "autonomy",
];

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// Weight of the last phrase relative to the first (linear falloff).
const POSITION_FLOOR: f32 = 0.3;

/// Extracts a `RequirementSet` from raw posting text.
///
/// Empty input yields an empty set with `Seniority::Unknown` — a vacuous
/// posting is not an error. Non-text input (NUL bytes or mostly control
/// characters) fails with `CoreError::Extraction`.
pub fn extract(raw_text: &str) -> Result<RequirementSet, CoreError> {
    reject_non_text(raw_text)?;

    let phrases = segment(raw_text);
    if phrases.is_empty() {
        return Ok(RequirementSet::empty());
    }

    let n = phrases.len();
    let items: Vec<RequirementItem> = phrases
        .iter()
        .map(|phrase| classify_phrase(phrase, n))
        .collect();

    let seniority = infer_seniority(raw_text);
    let culture_tags = collect_culture_tags(raw_text);

    debug!(
        items = items.len(),
        ?seniority,
        culture_tags = culture_tags.len(),
        "extracted requirement set"
    );

    Ok(RequirementSet {
        items,
        seniority,
        culture_tags,
    })
}

/// Rejects input that is not plausibly text: embedded NUL bytes, or a
/// non-trivial input dominated by control/replacement characters.
fn reject_non_text(raw_text: &str) -> Result<(), CoreError> {
    if raw_text.contains('\0') {
        return Err(CoreError::Extraction(
            "input contains NUL bytes".to_string(),
        ));
    }
    let total = raw_text.chars().count();
    if total < 8 {
        return Ok(());
    }
    let garbage = raw_text
        .chars()
        .filter(|c| (c.is_control() && !matches!(c, '\n' | '\r' | '\t')) || *c == '\u{FFFD}')
        .count();
    if garbage as f32 / total as f32 > 0.3 {
        return Err(CoreError::Extraction(format!(
            "input looks binary: {garbage}/{total} control characters"
        )));
    }
    Ok(())
}

fn classify_phrase(phrase: &Phrase, total: usize) -> RequirementItem {
    let lower = phrase.text.to_lowercase();

    let category = if QUALIFICATION_MARKERS.iter().any(|m| lower.contains(m)) {
        RequirementCategory::Qualification
    } else if lower.contains("years") || lower.contains("yrs") || has_title_marker(&lower) {
        RequirementCategory::ExperienceLevel
    } else if CULTURE_MARKERS.iter().any(|m| lower.contains(m)) {
        RequirementCategory::CultureSignal
    } else {
        RequirementCategory::Skill
    };

    // Nice-to-have wins over mandatory markers: "preferred" next to
    // "requirements" section headers shows up often and means optional.
    let (is_mandatory, modal) = if NICE_TO_HAVE_MARKERS.iter().any(|m| lower.contains(m)) {
        (false, 0.5)
    } else if MANDATORY_MARKERS.iter().any(|m| lower.contains(m)) {
        (true, 1.0)
    } else {
        (false, 0.75)
    };

    let position = if total <= 1 {
        1.0
    } else {
        1.0 - (1.0 - POSITION_FLOOR) * (phrase.index as f32 / (total - 1) as f32)
    };

    RequirementItem {
        text: phrase.text.clone(),
        category,
        weight: (position * modal).clamp(0.0, 1.0),
        is_mandatory,
    }
}

fn has_title_marker(lower: &str) -> bool {
    TITLE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Aggregates seniority from explicit year mentions first, title keywords
/// second. No signal → `Unknown`.
fn infer_seniority(raw_text: &str) -> Seniority {
    let lower = raw_text.to_lowercase();

    if let Some(years) = max_years_mentioned(&lower) {
        return match years {
            0..=1 => Seniority::Junior,
            2..=4 => Seniority::Mid,
            5..=7 => Seniority::Senior,
            _ => Seniority::Lead,
        };
    }

    if ["principal", "staff engineer", "lead "].iter().any(|m| lower.contains(m)) {
        Seniority::Lead
    } else if lower.contains("senior") || lower.contains("sr.") {
        Seniority::Senior
    } else if lower.contains("mid-level") || lower.contains("mid level") {
        Seniority::Mid
    } else if ["junior", "entry level", "entry-level", "intern"]
        .iter()
        .any(|m| lower.contains(m))
    {
        Seniority::Junior
    } else {
        Seniority::Unknown
    }
}

/// Largest `N` from `N+ years` / `N years` mentions, if any.
fn max_years_mentioned(lower: &str) -> Option<u32> {
    let bytes = lower.as_bytes();
    let mut best: Option<u32> = None;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let value: u32 = match lower[start..i].parse() {
                Ok(v) => v,
                Err(_) => continue, // overflow on absurd digit runs
            };
            let mut rest = &lower[i..];
            rest = rest.strip_prefix('+').unwrap_or(rest);
            let rest = rest.trim_start();
            if rest.starts_with("year") || rest.starts_with("yrs") {
                best = Some(best.map_or(value, |b| b.max(value)));
            }
        } else {
            i += 1;
        }
    }
    best
}

fn collect_culture_tags(raw_text: &str) -> BTreeSet<String> {
    let lower = raw_text.to_lowercase();
    CULTURE_TAGS
        .iter()
        .filter(|tag| lower.contains(*tag))
        .map(|tag| tag.to_string())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

//! Policy knobs for the pipeline stages.
//!
//! The core is a library with no ambient configuration source; every policy
//! is an explicit value passed into the stage that uses it, with `Default`
//! impls carrying the documented defaults.

use serde::{Deserialize, Serialize};

/// Tunables for skill resolution and overall scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPolicy {
    /// Minimum normalized token Jaccard for a fuzzy skill resolution.
    pub fuzzy_threshold: f32,
    /// Multiplicative penalty applied once per unmet mandatory requirement.
    /// `overall_score *= (1 - penalty)` for each mandatory gap.
    pub mandatory_gap_penalty: f32,
    pub recency: RecencyPolicy,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.6,
            mandatory_gap_penalty: 0.25,
            recency: RecencyPolicy::default(),
        }
    }
}

/// Floored half-life decay for skill recency.
///
/// `decay(months) = max(floor, 0.5 ^ (months / half_life_months))` —
/// monotonically non-increasing in age, never reaching zero, so
/// old-but-real experience is discounted but not erased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecencyPolicy {
    pub half_life_months: f32,
    pub floor: f32,
}

impl Default for RecencyPolicy {
    fn default() -> Self {
        Self {
            half_life_months: 24.0,
            floor: 0.25,
        }
    }
}

impl RecencyPolicy {
    /// Decay factor for a skill last exercised `months` ago.
    pub fn decay(&self, months: u32) -> f32 {
        let raw = (0.5_f32).powf(months as f32 / self.half_life_months);
        raw.max(self.floor).clamp(0.0, 1.0)
    }
}

/// Tunables for the customization planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerPolicy {
    /// Minimum fraction of a section's bullets that must carry a matched
    /// tag before the planner touches the section at all.
    pub min_section_overlap: f32,
    /// Confidence at or above which a matched bullet ranks in the leading
    /// tier when reordering.
    pub high_confidence: f32,
}

impl Default for PlannerPolicy {
    fn default() -> Self {
        Self {
            min_section_overlap: 0.2,
            high_confidence: 0.6,
        }
    }
}

/// Batch behavior when an edit operation fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    /// First invalid operation aborts the whole batch.
    Abort,
    /// Invalid operations are recorded and skipped; the rest apply.
    SkipInvalid,
}

/// Bundle of all stage policies, for callers running the full pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    pub matching: MatchPolicy,
    pub planner: PlannerPolicy,
    pub apply_mode: ApplyMode,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            matching: MatchPolicy::default(),
            planner: PlannerPolicy::default(),
            apply_mode: ApplyMode::Abort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_is_one_at_zero_months() {
        let policy = RecencyPolicy::default();
        assert!((policy.decay(0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_decay_halves_at_half_life() {
        let policy = RecencyPolicy {
            half_life_months: 24.0,
            floor: 0.0,
        };
        let d = policy.decay(24);
        assert!((d - 0.5).abs() < 1e-6, "decay at half-life was {d}");
    }

    #[test]
    fn test_decay_monotone_non_increasing() {
        let policy = RecencyPolicy::default();
        let mut prev = policy.decay(0);
        for months in 1..240 {
            let d = policy.decay(months);
            assert!(d <= prev, "decay increased at {months} months");
            prev = d;
        }
    }

    #[test]
    fn test_decay_never_below_floor() {
        let policy = RecencyPolicy::default();
        assert_eq!(policy.decay(10_000), policy.floor);
        assert!(policy.decay(10_000) > 0.0);
    }
}

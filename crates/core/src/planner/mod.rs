//! Customization Planner — turns a `MatchResult` and a `DocumentTree` into
//! an ordered list of `EditOperation`s.
//!
//! Policy, in priority order: reorder bullets inside each relevant section
//! so high-confidence evidence leads (stable on original order); never
//! suppress evidence of real experience; leave sections with too little
//! requirement overlap untouched; propose mechanical rewrites (synonym →
//! requirement surface term) as suggestions only.
//!
//! Pure function of its inputs: same `(match, tree)` always yields the
//! same operation sequence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::PlannerPolicy;
use crate::document::model::{BulletItem, BulletList, DocumentTree};
use crate::matching::synonyms::{contains_word, find_word, variants_of};
use crate::matching::MatchResult;

// ────────────────────────────────────────────────────────────────────────────
// Edit operations
// ────────────────────────────────────────────────────────────────────────────

/// An atomic, independently reversible structural edit. Serialized as
/// tagged JSON for the audit/undo contract with external collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOperation {
    /// Permute the reorderable children of a scope (bullets of a list, or
    /// sections of a section/root scope). `order` must be a permutation of
    /// the current child ids.
    Reorder { section: Uuid, order: Vec<Uuid> },
    /// Replace a bullet's text. Planner output of this variant is a
    /// suggestion for human review, never auto-applied by the pipeline.
    Rewrite { bullet: Uuid, new_text: String },
    /// Remove a bullet.
    Suppress { bullet: Uuid },
    /// Insert a new bullet into a list, after `after` (or first when None).
    Insert {
        section: Uuid,
        after: Option<Uuid>,
        text: String,
    },
}

/// The planner's output, split by application semantics: `operations` are
/// safe to apply directly, `suggestions` (rewrites) require explicit
/// confirmation downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub operations: Vec<EditOperation>,
    pub suggestions: Vec<EditOperation>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty() && self.suggestions.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Planning
// ────────────────────────────────────────────────────────────────────────────

/// Plans edits for a document given a match result.
pub fn plan(match_result: &MatchResult, tree: &DocumentTree, policy: &PlannerPolicy) -> Plan {
    let confidence = confidence_by_skill(match_result);

    let mut operations = Vec::new();
    let mut suggestions = Vec::new();

    for list in tree.bullet_lists() {
        if list.items.is_empty() {
            continue;
        }
        if section_overlap(list, &confidence) < policy.min_section_overlap {
            continue; // irrelevant section, do not touch
        }

        if let Some(order) = reordered_items(list, &confidence, policy) {
            operations.push(EditOperation::Reorder {
                section: list.id,
                order,
            });
        }

        for item in &list.items {
            suggestions.extend(rewrite_suggestion(item, match_result));
        }
    }

    debug!(
        operations = operations.len(),
        suggestions = suggestions.len(),
        "planned document edits"
    );
    Plan {
        operations,
        suggestions,
    }
}

/// Max confidence per matched (normalized) skill name.
fn confidence_by_skill(match_result: &MatchResult) -> BTreeMap<String, f32> {
    let mut out: BTreeMap<String, f32> = BTreeMap::new();
    for m in &match_result.per_requirement {
        if let Some(skill) = &m.matched_skill {
            let entry = out.entry(skill.clone()).or_insert(0.0);
            if m.confidence > *entry {
                *entry = m.confidence;
            }
        }
    }
    out
}

/// Fraction of a list's bullets carrying at least one matched tag.
fn section_overlap(list: &BulletList, confidence: &BTreeMap<String, f32>) -> f32 {
    let tagged = list
        .items
        .iter()
        .filter(|item| item.tags.iter().any(|t| confidence.contains_key(t)))
        .count();
    tagged as f32 / list.items.len() as f32
}

fn relevance(item: &BulletItem, confidence: &BTreeMap<String, f32>) -> f32 {
    item.tags
        .iter()
        .filter_map(|t| confidence.get(t).copied())
        .fold(0.0, f32::max)
}

/// Ranking tier of a bullet: high-confidence evidence (relevance at or
/// above the policy threshold), any matched evidence, unmatched.
fn tier(item: &BulletItem, confidence: &BTreeMap<String, f32>, policy: &PlannerPolicy) -> u8 {
    let relevance = relevance(item, confidence);
    if relevance >= policy.high_confidence {
        2
    } else if relevance > 0.0 {
        1
    } else {
        0
    }
}

/// Stable descending sort by tier; `None` when the order is unchanged.
/// Within a tier the original order is kept, so equally good bullets never
/// shuffle on confidence noise.
fn reordered_items(
    list: &BulletList,
    confidence: &BTreeMap<String, f32>,
    policy: &PlannerPolicy,
) -> Option<Vec<Uuid>> {
    let mut indexed: Vec<(usize, u8)> = list
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| (i, tier(item, confidence, policy)))
        .collect();
    // sort_by is stable: equal tiers keep original order.
    indexed.sort_by(|a, b| b.1.cmp(&a.1));

    if indexed.iter().enumerate().all(|(pos, (i, _))| pos == *i) {
        return None;
    }
    Some(indexed.iter().map(|(i, _)| list.items[*i].id).collect())
}

/// Proposes a mechanical rewrite when a bullet evidences a requirement
/// through a diverging surface form (e.g. bullet says "k8s", the posting
/// says "Kubernetes"). The requirement's own casing is spliced in; no
/// prose is generated.
fn rewrite_suggestion(item: &BulletItem, match_result: &MatchResult) -> Option<EditOperation> {
    // ASCII folding keeps byte offsets valid for splicing into the original.
    let text_lower = item.text.to_ascii_lowercase();
    for m in &match_result.per_requirement {
        let Some(skill) = &m.matched_skill else {
            continue;
        };
        if !item.tags.contains(skill) {
            continue;
        }
        let req_lower = m.requirement.text.to_ascii_lowercase();
        for bullet_variant in variants_of(skill) {
            let Some(start) = find_word(&text_lower, &bullet_variant) else {
                continue;
            };
            for req_variant in variants_of(skill) {
                if req_variant == bullet_variant || !contains_word(&req_lower, &req_variant) {
                    continue;
                }
                // Splice the requirement's surface form (original casing)
                // over the bullet's variant.
                let surface = original_casing(&m.requirement.text, &req_variant)?;
                let mut new_text = item.text.clone();
                new_text.replace_range(start..start + bullet_variant.len(), &surface);
                if new_text != item.text {
                    return Some(EditOperation::Rewrite {
                        bullet: item.id,
                        new_text,
                    });
                }
            }
        }
    }
    None
}

/// The requirement's own casing of a lowercase variant, if present.
fn original_casing(text: &str, variant_lower: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let start = find_word(&lower, variant_lower)?;
    Some(text[start..start + variant_lower.len()].to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MatchPolicy, PlannerPolicy};
    use crate::document::parser::{parse, SkillLexicon};
    use crate::extraction::{RequirementCategory, RequirementItem, RequirementSet, Seniority};
    use crate::matching::match_requirements;
    use crate::models::profile::{SkillEntry, SkillProfile};
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn make_profile(skills: &[(&str, f32)]) -> SkillProfile {
        let mut profile = SkillProfile::new(Utc::now());
        for (name, proficiency) in skills {
            profile.insert(SkillEntry {
                name: name.to_string(),
                proficiency: *proficiency,
                recency_months: 0,
                evidence_source_ids: vec![],
            });
        }
        profile
    }

    fn make_set(texts: &[&str]) -> RequirementSet {
        RequirementSet {
            items: texts
                .iter()
                .map(|t| RequirementItem {
                    text: t.to_string(),
                    category: RequirementCategory::Skill,
                    weight: 1.0,
                    is_mandatory: false,
                })
                .collect(),
            seniority: Seniority::Unknown,
            culture_tags: BTreeSet::new(),
        }
    }

    const DOC: &str = "\\section{Experience}\n\
\\begin{itemize}\n\
\\item Shipped internal tooling in Python\n\
\\item Built Rust data plane\n\
\\item Operated Rust deployment pipelines\n\
\\end{itemize}\n";

    fn plan_for(doc: &str, profile_skills: &[(&str, f32)], reqs: &[&str]) -> (Plan, DocumentTree) {
        let profile = make_profile(profile_skills);
        let match_result =
            match_requirements(&make_set(reqs), &profile, &MatchPolicy::default()).unwrap();
        let lexicon = SkillLexicon::from_profile(&profile);
        let tree = parse(doc, &lexicon).unwrap();
        let plan = plan(&match_result, &tree, &PlannerPolicy::default());
        (plan, tree)
    }

    #[test]
    fn test_reorder_puts_matched_bullets_first_stable() {
        // Bullets [A(python), B(rust), C(rust)] with rust matched high →
        // B, C before A, with B before C preserved.
        let (plan, tree) = plan_for(DOC, &[("rust", 0.9), ("python", 0.3)], &["Rust"]);
        let reorder = plan
            .operations
            .iter()
            .find_map(|op| match op {
                EditOperation::Reorder { order, .. } => Some(order.clone()),
                _ => None,
            })
            .expect("expected a reorder");
        let bullets = tree.bullets();
        assert_eq!(reorder[0], bullets[1].id, "first Rust bullet leads");
        assert_eq!(reorder[1], bullets[2].id, "second Rust bullet keeps relative order");
        assert_eq!(reorder[2], bullets[0].id, "unmatched bullet goes last");
    }

    #[test]
    fn test_no_reorder_when_order_already_optimal() {
        let doc = "\\begin{itemize}\n\\item Rust work\n\\item Unrelated\n\\end{itemize}\n";
        let (plan, _) = plan_for(doc, &[("rust", 0.9)], &["Rust"]);
        assert!(
            !plan.operations.iter().any(|op| matches!(op, EditOperation::Reorder { .. })),
            "already-sorted list needs no reorder"
        );
    }

    #[test]
    fn test_irrelevant_section_untouched() {
        let doc = "\\section{Hobbies}\n\\begin{itemize}\n\\item Chess\n\\item Hiking\n\\item Baking\n\\item Sailing\n\\item Painting\n\\end{itemize}\n";
        let (plan, _) = plan_for(doc, &[("rust", 0.9)], &["Rust"]);
        assert!(plan.is_empty(), "no bullet matches → overlap below minimum → no ops");
    }

    #[test]
    fn test_planner_never_suppresses() {
        let (plan, _) = plan_for(DOC, &[("rust", 0.9), ("python", 0.3)], &["Rust", "Haskell"]);
        let all = plan.operations.iter().chain(plan.suggestions.iter());
        assert!(
            !all.into_iter().any(|op| matches!(op, EditOperation::Suppress { .. })),
            "evidence of real experience is never deleted"
        );
    }

    #[test]
    fn test_rewrite_suggested_for_diverging_surface_form() {
        let doc = "\\begin{itemize}\n\\item Ran k8s clusters in production\n\\end{itemize}\n";
        let (plan, tree) = plan_for(doc, &[("kubernetes", 0.9)], &["Kubernetes experience"]);
        let rewrite = plan
            .suggestions
            .iter()
            .find_map(|op| match op {
                EditOperation::Rewrite { bullet, new_text } => Some((*bullet, new_text.clone())),
                _ => None,
            })
            .expect("expected a rewrite suggestion");
        assert_eq!(rewrite.0, tree.bullets()[0].id);
        assert_eq!(rewrite.1, "Ran Kubernetes clusters in production");
    }

    #[test]
    fn test_no_rewrite_when_surface_forms_agree() {
        let doc = "\\begin{itemize}\n\\item Ran Kubernetes clusters\n\\end{itemize}\n";
        let (plan, _) = plan_for(doc, &[("kubernetes", 0.9)], &["Kubernetes experience"]);
        assert!(plan.suggestions.is_empty());
    }

    #[test]
    fn test_high_confidence_threshold_shapes_ranking() {
        let doc = "\\begin{itemize}\n\\item Tinkered with Go tooling\n\\item Shipped Rust platform\n\\end{itemize}\n";
        let profile = make_profile(&[("go", 0.3), ("rust", 0.9)]);
        let match_result =
            match_requirements(&make_set(&["Go", "Rust"]), &profile, &MatchPolicy::default())
                .unwrap();
        let tree = parse(doc, &SkillLexicon::from_profile(&profile)).unwrap();

        // Default threshold: only the Rust match is high confidence, so its
        // bullet moves ahead of the weaker Go evidence.
        let strict = plan(&match_result, &tree, &PlannerPolicy::default());
        assert!(strict
            .operations
            .iter()
            .any(|op| matches!(op, EditOperation::Reorder { .. })));

        // Lowered threshold: both matches rank in the leading tier and the
        // original order stands.
        let lenient = PlannerPolicy {
            high_confidence: 0.2,
            ..PlannerPolicy::default()
        };
        let relaxed = plan(&match_result, &tree, &lenient);
        assert!(!relaxed
            .operations
            .iter()
            .any(|op| matches!(op, EditOperation::Reorder { .. })));
    }

    #[test]
    fn test_plan_is_deterministic() {
        let (a, tree) = plan_for(DOC, &[("rust", 0.9), ("python", 0.3)], &["Rust", "Python"]);
        let profile = make_profile(&[("rust", 0.9), ("python", 0.3)]);
        let match_result = match_requirements(
            &make_set(&["Rust", "Python"]),
            &profile,
            &MatchPolicy::default(),
        )
        .unwrap();
        let b = plan(&match_result, &tree, &PlannerPolicy::default());
        // Same tree value → identical plans (op ids come from the tree).
        let c = plan(&match_result, &tree, &PlannerPolicy::default());
        assert_eq!(b, c);
        assert_eq!(a.operations.len(), b.operations.len());
    }

    #[test]
    fn test_edit_operation_serializes_tagged() {
        let op = EditOperation::Suppress { bullet: Uuid::nil() };
        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains("\"op\":\"suppress\""));
    }
}

//! tailor-core — matches a candidate's skill profile against a job
//! posting's extracted requirements and drives structural edits to an
//! existing LaTeX résumé from the result.
//!
//! The crate is a stateless, synchronous pipeline of pure stages:
//!
//! ```text
//! posting text ─ extract ─▶ RequirementSet
//! RequirementSet + SkillProfile ─ match ─▶ MatchResult
//! LaTeX source ─ parse ─▶ DocumentTree
//! MatchResult + DocumentTree ─ plan ─▶ EditOperations
//! EditOperations + DocumentTree ─ apply ─▶ new DocumentTree ─▶ text
//! ```
//!
//! Each stage takes immutable inputs and produces a new immutable output;
//! independent runs need no coordination. All I/O (fetching postings,
//! building profiles, persisting documents) belongs to external
//! collaborators that hand the core plain in-memory data.

pub mod config;
pub mod document;
pub mod errors;
pub mod extraction;
pub mod matching;
pub mod models;
pub mod planner;
pub mod render;

pub use config::{ApplyMode, CoreConfig, MatchPolicy, PlannerPolicy, RecencyPolicy};
pub use document::{parse, serialize, DocumentTree, SkillLexicon};
pub use errors::CoreError;
pub use extraction::{extract, RequirementSet, Seniority};
pub use matching::{match_requirements, MatchResult};
pub use models::posting::JobPosting;
pub use models::profile::{SkillEntry, SkillProfile};
pub use planner::{plan, EditOperation, Plan};
pub use render::{apply, ApplyReport};

use tracing::info;

/// Everything one tailoring run produced, including the audit trail the
/// export and history collaborators consume.
#[derive(Debug, Clone)]
pub struct TailorOutcome {
    pub requirements: RequirementSet,
    pub match_result: MatchResult,
    /// Operations that were applied to produce `document`.
    pub applied: Vec<EditOperation>,
    /// Rewrite suggestions awaiting explicit confirmation; not applied.
    pub suggestions: Vec<EditOperation>,
    /// The new document revision.
    pub document: DocumentTree,
    /// `document`, serialized.
    pub text: String,
}

/// Runs the full pipeline for one posting against one profile snapshot and
/// one résumé source.
///
/// A failure in any stage halts the pipeline before dependent stages run;
/// no partial `MatchResult`/`DocumentTree` pair ever reaches the renderer.
/// Rewrite suggestions from the planner are returned for review, never
/// auto-applied.
pub fn tailor(
    posting: &JobPosting,
    profile: &SkillProfile,
    latex_source: &str,
    config: &CoreConfig,
) -> Result<TailorOutcome, CoreError> {
    let requirements = extraction::extract(&posting.raw_text)?;
    let match_result = matching::match_requirements(&requirements, profile, &config.matching)?;

    let lexicon = SkillLexicon::from_profile(profile);
    let tree = document::parse(latex_source, &lexicon)?;

    let plan = planner::plan(&match_result, &tree, &config.planner);
    let report = render::apply(&tree, &plan.operations, config.apply_mode)?;

    let text = document::serialize(&report.tree);
    info!(
        posting = %posting.id,
        overall_score = match_result.overall_score,
        applied = report.applied.len(),
        suggestions = plan.suggestions.len(),
        "tailoring run complete"
    );

    Ok(TailorOutcome {
        requirements,
        match_result,
        applied: report.applied,
        suggestions: plan.suggestions,
        document: report.tree,
        text,
    })
}

//! Document Renderer — applies `EditOperation`s to a `DocumentTree`.
//!
//! Operations apply in sequence onto a clone of the input tree; the input
//! revision is never mutated. Each operation validates its preconditions
//! before touching anything, so a failing operation is all-or-nothing.
//! `ApplyMode` decides whether an invalid operation aborts the batch or is
//! recorded and skipped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ApplyMode;
use crate::document::model::{BulletItem, DocNode, DocumentTree, FormatFragment, SourceSpan};
use crate::errors::CoreError;
use crate::planner::EditOperation;

/// An operation rejected under `ApplyMode::SkipInvalid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedOp {
    pub op: EditOperation,
    pub reason: String,
}

/// Result of applying a batch: the new tree revision plus the audit trail
/// of what applied and what was skipped.
#[derive(Debug, Clone)]
pub struct ApplyReport {
    pub tree: DocumentTree,
    pub applied: Vec<EditOperation>,
    pub skipped: Vec<SkippedOp>,
}

/// Applies `ops` in order to a clone of `tree`.
///
/// An empty batch yields a revision that serializes byte-identically to
/// the input.
pub fn apply(
    tree: &DocumentTree,
    ops: &[EditOperation],
    mode: ApplyMode,
) -> Result<ApplyReport, CoreError> {
    let mut next = tree.clone();
    let mut applied = Vec::new();
    let mut skipped = Vec::new();

    for op in ops {
        match apply_one(&mut next, op) {
            Ok(()) => applied.push(op.clone()),
            Err(err) => match mode {
                ApplyMode::Abort => return Err(err),
                ApplyMode::SkipInvalid => {
                    warn!(%err, "skipping invalid edit operation");
                    skipped.push(SkippedOp {
                        op: op.clone(),
                        reason: err.to_string(),
                    });
                }
            },
        }
    }

    debug!(
        applied = applied.len(),
        skipped = skipped.len(),
        "applied edit batch"
    );
    Ok(ApplyReport {
        tree: next,
        applied,
        skipped,
    })
}

/// Applies one operation. Validates every precondition before the first
/// mutation so an `Err` leaves the tree exactly as it was.
fn apply_one(tree: &mut DocumentTree, op: &EditOperation) -> Result<(), CoreError> {
    match op {
        EditOperation::Reorder { section, order } => reorder(tree, *section, order),
        EditOperation::Rewrite { bullet, new_text } => {
            let item = tree.bullet_mut(*bullet).ok_or_else(|| {
                CoreError::InvalidOperation(format!("rewrite target {bullet} not found"))
            })?;
            item.text = new_text.clone();
            Ok(())
        }
        EditOperation::Suppress { bullet } => {
            let list = tree.list_containing_mut(*bullet).ok_or_else(|| {
                CoreError::InvalidOperation(format!("suppress target {bullet} not found"))
            })?;
            list.items.retain(|i| i.id != *bullet);
            Ok(())
        }
        EditOperation::Insert {
            section,
            after,
            text,
        } => insert(tree, *section, *after, text),
    }
}

/// Permutes the reorderable children of a scope: bullets when the target
/// is a list, child sections when it is a section or the root.
fn reorder(tree: &mut DocumentTree, target: Uuid, order: &[Uuid]) -> Result<(), CoreError> {
    if let Some(list) = tree.list_mut(target) {
        let current: Vec<Uuid> = list.items.iter().map(|i| i.id).collect();
        check_permutation(&current, order)?;
        let mut by_id: BTreeMap<Uuid, BulletItem> = std::mem::take(&mut list.items)
            .into_iter()
            .map(|item| (item.id, item))
            .collect();
        list.items = order.iter().filter_map(|id| by_id.remove(id)).collect();
        return Ok(());
    }

    let children = if target == tree.root_id {
        &mut tree.nodes
    } else {
        let section = tree.section_mut(target).ok_or_else(|| {
            CoreError::InvalidOperation(format!("reorder target {target} not found"))
        })?;
        &mut section.children
    };
    reorder_sections(children, order)
}

/// Permutes the `Section` children of a scope in place, leaving fragment
/// and list positions fixed so surrounding bytes are untouched.
fn reorder_sections(children: &mut [DocNode], order: &[Uuid]) -> Result<(), CoreError> {
    let slots: Vec<usize> = children
        .iter()
        .enumerate()
        .filter_map(|(i, n)| matches!(n, DocNode::Section(_)).then_some(i))
        .collect();
    let current: Vec<Uuid> = slots
        .iter()
        .map(|&i| match &children[i] {
            DocNode::Section(s) => s.id,
            _ => unreachable!(),
        })
        .collect();
    check_permutation(&current, order)?;

    // `taken[k]` is the section originally at `slots[k]`.
    let mut taken: Vec<Option<DocNode>> = slots
        .iter()
        .map(|&i| {
            Some(std::mem::replace(
                &mut children[i],
                DocNode::Fragment(FormatFragment {
                    raw: String::new(),
                    span: SourceSpan::synthetic(),
                }),
            ))
        })
        .collect();
    for (&slot, id) in slots.iter().zip(order.iter()) {
        if let Some(node) = current
            .iter()
            .position(|c| c == id)
            .and_then(|pos| taken[pos].take())
        {
            children[slot] = node;
        }
    }
    Ok(())
}

fn check_permutation(current: &[Uuid], proposed: &[Uuid]) -> Result<(), CoreError> {
    let mut a = current.to_vec();
    let mut b = proposed.to_vec();
    a.sort();
    b.sort();
    if a != b {
        return Err(CoreError::InvalidOperation(format!(
            "reorder is not a permutation of the {} current children",
            current.len()
        )));
    }
    Ok(())
}

/// Inserts a new bullet, copying the `\item` style of its list.
fn insert(
    tree: &mut DocumentTree,
    list_id: Uuid,
    after: Option<Uuid>,
    text: &str,
) -> Result<(), CoreError> {
    let list = tree
        .list_mut(list_id)
        .ok_or_else(|| CoreError::InvalidOperation(format!("insert target {list_id} not found")))?;

    let position = match after {
        Some(anchor) => {
            let pos = list.items.iter().position(|i| i.id == anchor).ok_or_else(|| {
                CoreError::InvalidOperation(format!("insert anchor {anchor} not found"))
            })?;
            pos + 1
        }
        None => 0,
    };

    let (prefix, suffix) = match list.items.first() {
        Some(first) => (first.prefix.clone(), first.suffix.clone()),
        None => ("\\item ".to_string(), "\n".to_string()),
    };
    list.items.insert(
        position,
        BulletItem {
            id: Uuid::new_v4(),
            prefix,
            text: text.to_string(),
            suffix,
            span: SourceSpan::synthetic(),
            tags: Default::default(),
        },
    );
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

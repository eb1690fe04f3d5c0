//! Structural document model for LaTeX résumés.
//!
//! Only a bounded grammar is modeled: section/subsection headings,
//! itemize/enumerate environments and their `\item` bullets. Everything
//! else — preamble, macros, styling — is an opaque `FormatFragment` whose
//! raw bytes pass through serialization untouched. Every node stores its
//! exact source text, so serializing an unmodified tree reproduces the
//! input byte-for-byte.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Byte range into the originally parsed source. Synthetic nodes (inserted
/// bullets) carry an empty span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn synthetic() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Raw LaTeX text not subject to semantic edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatFragment {
    pub raw: String,
    pub span: SourceSpan,
}

/// One `\item` bullet. `prefix` holds indentation plus the `\item` marker
/// and following whitespace, `suffix` the final line terminator; the raw
/// form is exactly `prefix + text + suffix`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletItem {
    pub id: Uuid,
    pub prefix: String,
    pub text: String,
    pub suffix: String,
    pub span: SourceSpan,
    /// Normalized profile skill names this bullet evidences, inferred once
    /// at parse time from the skill lexicon.
    pub tags: BTreeSet<String>,
}

impl BulletItem {
    pub fn raw(&self) -> String {
        format!("{}{}{}", self.prefix, self.text, self.suffix)
    }
}

/// An itemize/enumerate environment with its ordered bullets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletList {
    pub id: Uuid,
    pub env: String,
    pub begin: FormatFragment,
    pub items: Vec<BulletItem>,
    pub end: FormatFragment,
}

/// A `\section`/`\subsection` scope with its ordered children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: Uuid,
    pub title: String,
    /// 1 for `\section`, 2 for `\subsection`.
    pub depth: u8,
    pub heading: FormatFragment,
    pub children: Vec<DocNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocNode {
    Fragment(FormatFragment),
    List(BulletList),
    Section(Section),
}

/// Rooted structural tree of one source document.
///
/// Mutated only by the renderer applying edit operations; each application
/// clones the tree, so revisions never alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTree {
    /// Id of the root scope, usable as a reorder target for top-level
    /// sections.
    pub root_id: Uuid,
    pub nodes: Vec<DocNode>,
    pub source_len: usize,
}

impl DocumentTree {
    /// All sections, depth-first in document order.
    pub fn sections(&self) -> Vec<&Section> {
        let mut out = Vec::new();
        collect_sections(&self.nodes, &mut out);
        out
    }

    /// Titles of all sections in document order.
    pub fn section_titles(&self) -> Vec<&str> {
        self.sections().iter().map(|s| s.title.as_str()).collect()
    }

    /// Case-insensitive section lookup by title.
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections()
            .into_iter()
            .find(|s| s.title.eq_ignore_ascii_case(title))
    }

    /// All bullet lists, depth-first in document order.
    pub fn bullet_lists(&self) -> Vec<&BulletList> {
        let mut out = Vec::new();
        collect_lists(&self.nodes, &mut out);
        out
    }

    /// All bullets in document order.
    pub fn bullets(&self) -> Vec<&BulletItem> {
        self.bullet_lists()
            .into_iter()
            .flat_map(|l| l.items.iter())
            .collect()
    }

    pub fn bullet(&self, id: Uuid) -> Option<&BulletItem> {
        self.bullets().into_iter().find(|b| b.id == id)
    }

    /// Bullet texts of the conventional skills sections, if present.
    pub fn skills_inventory(&self) -> Vec<String> {
        const SKILL_SECTIONS: &[&str] = &["Skills", "Technical Skills", "Core Competencies"];
        let mut out = Vec::new();
        for name in SKILL_SECTIONS {
            if let Some(section) = self.section(name) {
                let mut lists = Vec::new();
                collect_lists(&section.children, &mut lists);
                for list in lists {
                    out.extend(list.items.iter().map(|i| i.text.trim().to_string()));
                }
            }
        }
        out
    }

    pub fn list_mut(&mut self, id: Uuid) -> Option<&mut BulletList> {
        find_list_mut(&mut self.nodes, id)
    }

    /// The list containing a given bullet, mutable.
    pub fn list_containing_mut(&mut self, bullet_id: Uuid) -> Option<&mut BulletList> {
        find_list_containing_mut(&mut self.nodes, bullet_id)
    }

    pub fn bullet_mut(&mut self, id: Uuid) -> Option<&mut BulletItem> {
        self.list_containing_mut(id)
            .and_then(|list| list.items.iter_mut().find(|i| i.id == id))
    }

    pub fn section_mut(&mut self, id: Uuid) -> Option<&mut Section> {
        find_section_mut(&mut self.nodes, id)
    }
}

fn collect_sections<'a>(nodes: &'a [DocNode], out: &mut Vec<&'a Section>) {
    for node in nodes {
        if let DocNode::Section(section) = node {
            out.push(section);
            collect_sections(&section.children, out);
        }
    }
}

fn collect_lists<'a>(nodes: &'a [DocNode], out: &mut Vec<&'a BulletList>) {
    for node in nodes {
        match node {
            DocNode::List(list) => out.push(list),
            DocNode::Section(section) => collect_lists(&section.children, out),
            DocNode::Fragment(_) => {}
        }
    }
}

fn find_list_mut(nodes: &mut [DocNode], id: Uuid) -> Option<&mut BulletList> {
    for node in nodes {
        match node {
            DocNode::List(list) if list.id == id => return Some(list),
            DocNode::Section(section) => {
                if let Some(found) = find_list_mut(&mut section.children, id) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

fn find_list_containing_mut(nodes: &mut [DocNode], bullet_id: Uuid) -> Option<&mut BulletList> {
    for node in nodes {
        match node {
            DocNode::List(list) if list.items.iter().any(|i| i.id == bullet_id) => {
                return Some(list)
            }
            DocNode::Section(section) => {
                if let Some(found) = find_list_containing_mut(&mut section.children, bullet_id) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

fn find_section_mut(nodes: &mut [DocNode], id: Uuid) -> Option<&mut Section> {
    for node in nodes {
        if let DocNode::Section(section) = node {
            if section.id == id {
                return Some(section);
            }
            if let Some(found) = find_section_mut(&mut section.children, id) {
                return Some(found);
            }
        }
    }
    None
}

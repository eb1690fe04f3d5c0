//! LaTeX parser for the bounded résumé grammar.
//!
//! Recognized structure: `\section{..}` / `\subsection{..}` headings,
//! `itemize`/`enumerate` environments with `\item` bullets, and the
//! `\begin{document}`/`\end{document}` boundary. Every other line is
//! carried as an opaque fragment. Parsing is strict: unbalanced
//! environments or an unclosed heading brace fail with a byte offset and
//! no partial tree.

use std::collections::BTreeSet;

use tracing::debug;
use uuid::Uuid;

use crate::document::model::{
    BulletItem, BulletList, DocNode, DocumentTree, FormatFragment, Section, SourceSpan,
};
use crate::errors::CoreError;
use crate::matching::synonyms::{contains_word, variants_of};
use crate::models::profile::SkillProfile;

// ────────────────────────────────────────────────────────────────────────────
// Skill lexicon for parse-time bullet tagging
// ────────────────────────────────────────────────────────────────────────────

/// Variant → canonical skill-name pairs used to tag bullets at parse time.
#[derive(Debug, Clone, Default)]
pub struct SkillLexicon {
    entries: Vec<(String, String)>,
}

impl SkillLexicon {
    /// A lexicon that tags nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the lexicon from a profile snapshot: every skill key plus its
    /// known synonym variants, all mapping back to the profile key.
    pub fn from_profile(profile: &SkillProfile) -> Self {
        let mut entries = Vec::new();
        for key in profile.skills.keys() {
            for variant in variants_of(key) {
                entries.push((variant, key.clone()));
            }
        }
        Self { entries }
    }

    /// Canonical skill names mentioned (word-bounded) in `text`.
    pub fn tag(&self, text: &str) -> BTreeSet<String> {
        let lower = text.to_lowercase();
        self.entries
            .iter()
            .filter(|(variant, _)| contains_word(&lower, variant))
            .map(|(_, canonical)| canonical.clone())
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parser
// ────────────────────────────────────────────────────────────────────────────

const TRACKED_ENVS: &[&str] = &["itemize", "enumerate"];

/// Parses LaTeX source into a `DocumentTree`, tagging bullets from the
/// lexicon. `serialize(parse(s)) == s` holds for any accepted input.
pub fn parse(source: &str, lexicon: &SkillLexicon) -> Result<DocumentTree, CoreError> {
    let lines = collect_lines(source);
    let mut parser = Parser {
        lexicon,
        root: Vec::new(),
        open: Vec::new(),
        frag: None,
        doc_begin: None,
        doc_end_seen: false,
    };

    let mut i = 0;
    while i < lines.len() {
        let (start, line) = lines[i];
        let trimmed = line.trim_start();
        let cmd_offset = start + (line.len() - trimmed.len());

        if let Some((depth, rest)) = heading_of(trimmed) {
            if let Some(title) = brace_content(rest) {
                parser.flush_frag();
                parser.close_sections(depth);
                parser.open.push(Section {
                    id: Uuid::new_v4(),
                    title,
                    depth,
                    heading: fragment(start, line),
                    children: Vec::new(),
                });
            } else {
                return Err(CoreError::DocumentParse {
                    offset: cmd_offset,
                    message: "unclosed brace in section heading".to_string(),
                });
            }
        } else if let Some(env) = begin_env_of(trimmed).filter(|e| is_tracked(e)) {
            parser.flush_frag();
            let (list, next) = parse_list(&lines, i, cmd_offset, env, parser.lexicon)?;
            parser.current_children().push(DocNode::List(list));
            i = next;
        } else if end_env_of(trimmed).is_some_and(|e| is_tracked(&e)) {
            return Err(CoreError::DocumentParse {
                offset: cmd_offset,
                message: format!(
                    "\\end{{{}}} without matching \\begin",
                    end_env_of(trimmed).unwrap()
                ),
            });
        } else if begin_env_of(trimmed).as_deref() == Some("document") {
            if parser.doc_begin.is_none() {
                parser.doc_begin = Some(cmd_offset);
            }
            parser.push_frag_line(start, line);
        } else if end_env_of(trimmed).as_deref() == Some("document") {
            if parser.doc_begin.is_none() {
                return Err(CoreError::DocumentParse {
                    offset: cmd_offset,
                    message: "\\end{document} without \\begin{document}".to_string(),
                });
            }
            parser.doc_end_seen = true;
            parser.flush_frag();
            parser.close_sections(1);
            parser.push_frag_line(start, line);
        } else {
            parser.push_frag_line(start, line);
        }
        i += 1;
    }

    if let (Some(offset), false) = (parser.doc_begin, parser.doc_end_seen) {
        return Err(CoreError::DocumentParse {
            offset,
            message: "\\begin{document} is never closed".to_string(),
        });
    }

    parser.flush_frag();
    parser.close_sections(1);

    let tree = DocumentTree {
        root_id: Uuid::new_v4(),
        nodes: parser.root,
        source_len: source.len(),
    };
    debug!(
        sections = tree.sections().len(),
        bullets = tree.bullets().len(),
        bytes = source.len(),
        "parsed document"
    );
    Ok(tree)
}

struct Parser<'a> {
    lexicon: &'a SkillLexicon,
    root: Vec<DocNode>,
    open: Vec<Section>,
    frag: Option<(usize, String)>,
    doc_begin: Option<usize>,
    doc_end_seen: bool,
}

impl Parser<'_> {
    fn current_children(&mut self) -> &mut Vec<DocNode> {
        match self.open.last_mut() {
            Some(section) => &mut section.children,
            None => &mut self.root,
        }
    }

    fn push_frag_line(&mut self, start: usize, line: &str) {
        match &mut self.frag {
            Some((_, buf)) => buf.push_str(line),
            None => self.frag = Some((start, line.to_string())),
        }
    }

    fn flush_frag(&mut self) {
        if let Some((start, raw)) = self.frag.take() {
            let span = SourceSpan {
                start,
                end: start + raw.len(),
            };
            self.current_children()
                .push(DocNode::Fragment(FormatFragment { raw, span }));
        }
    }

    /// Closes open sections at `depth` or deeper, folding each into its
    /// parent scope.
    fn close_sections(&mut self, depth: u8) {
        self.flush_frag();
        while self.open.last().is_some_and(|s| s.depth >= depth) {
            if let Some(section) = self.open.pop() {
                self.current_children().push(DocNode::Section(section));
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Bullet-list sub-parser
// ────────────────────────────────────────────────────────────────────────────

/// Parses one tracked environment starting at `lines[begin_idx]`. Returns
/// the list and the index of its `\end` line. Nested tracked environments
/// inside an item are folded into that item's raw text (they round-trip
/// but are not structurally modeled).
fn parse_list(
    lines: &[(usize, &str)],
    begin_idx: usize,
    begin_offset: usize,
    env: String,
    lexicon: &SkillLexicon,
) -> Result<(BulletList, usize), CoreError> {
    let (begin_start, begin_line) = lines[begin_idx];
    let mut list = BulletList {
        id: Uuid::new_v4(),
        env,
        begin: fragment(begin_start, begin_line),
        items: Vec::new(),
        end: FormatFragment {
            raw: String::new(),
            span: SourceSpan::synthetic(),
        },
    };
    let mut current: Option<BulletItem> = None;
    let mut nested = 0u32;

    let mut j = begin_idx + 1;
    while j < lines.len() {
        let (start, line) = lines[j];
        let trimmed = line.trim_start();
        let cmd_offset = start + (line.len() - trimmed.len());

        if nested == 0 {
            if let Some(name) = end_env_of(trimmed) {
                if name == list.env {
                    finish_item(&mut list, &mut current, lexicon);
                    list.end = fragment(start, line);
                    return Ok((list, j));
                }
                if is_tracked(&name) {
                    return Err(CoreError::DocumentParse {
                        offset: cmd_offset,
                        message: format!(
                            "\\end{{{name}}} closes mismatched environment (expected {})",
                            list.env
                        ),
                    });
                }
            }
            if let Some(rest) = item_rest_of(trimmed) {
                finish_item(&mut list, &mut current, lexicon);
                let marker_len = line.len() - rest.len();
                let body = rest.trim_start();
                let prefix = &line[..marker_len + (rest.len() - body.len())];
                let (text, suffix) = split_terminator(body);
                current = Some(BulletItem {
                    id: Uuid::new_v4(),
                    prefix: prefix.to_string(),
                    text: text.to_string(),
                    suffix: suffix.to_string(),
                    span: SourceSpan {
                        start,
                        end: start + line.len(),
                    },
                    tags: BTreeSet::new(),
                });
                j += 1;
                continue;
            }
        }

        if begin_env_of(trimmed).is_some_and(|e| is_tracked(&e)) {
            nested += 1;
        } else if nested > 0 && end_env_of(trimmed).is_some_and(|e| is_tracked(&e)) {
            nested -= 1;
        }

        // Continuation: extend the current item, or the begin fragment when
        // no item has started yet.
        match &mut current {
            Some(item) => {
                let (text, suffix) = split_terminator(line);
                item.text.push_str(&item.suffix);
                item.text.push_str(text);
                item.suffix = suffix.to_string();
                item.span.end = start + line.len();
            }
            None => {
                list.begin.raw.push_str(line);
                list.begin.span.end = start + line.len();
            }
        }
        j += 1;
    }

    Err(CoreError::DocumentParse {
        offset: begin_offset,
        message: format!("\\begin{{{}}} is never closed", list.env),
    })
}

fn finish_item(list: &mut BulletList, current: &mut Option<BulletItem>, lexicon: &SkillLexicon) {
    if let Some(mut item) = current.take() {
        item.tags = lexicon.tag(&item.text);
        list.items.push(item);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Line-level helpers
// ────────────────────────────────────────────────────────────────────────────

/// Lines of `source` with their byte offsets, terminators included.
fn collect_lines(source: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut offset = 0;
    while offset < source.len() {
        let rest = &source[offset..];
        let len = rest.find('\n').map(|i| i + 1).unwrap_or(rest.len());
        out.push((offset, &rest[..len]));
        offset += len;
    }
    out
}

fn fragment(start: usize, line: &str) -> FormatFragment {
    FormatFragment {
        raw: line.to_string(),
        span: SourceSpan {
            start,
            end: start + line.len(),
        },
    }
}

/// Splits a line into (body, terminator).
fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// `Some((depth, rest_after_command))` if the line opens a heading.
fn heading_of(trimmed: &str) -> Option<(u8, &str)> {
    for (cmd, depth) in [("\\subsection", 2u8), ("\\section", 1u8)] {
        if let Some(rest) = trimmed.strip_prefix(cmd) {
            let rest = rest.strip_prefix('*').unwrap_or(rest);
            if rest.starts_with('{') {
                return Some((depth, rest));
            }
        }
    }
    None
}

/// Content of the leading `{...}` group, honoring nested braces, if the
/// group closes within the line.
fn brace_content(rest: &str) -> Option<String> {
    let inner = rest.strip_prefix('{')?;
    let mut depth = 1u32;
    for (i, ch) in inner.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(inner[..i].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

fn begin_env_of(trimmed: &str) -> Option<String> {
    let rest = trimmed.strip_prefix("\\begin{")?;
    rest.find('}').map(|i| rest[..i].to_string())
}

fn end_env_of(trimmed: &str) -> Option<String> {
    let rest = trimmed.strip_prefix("\\end{")?;
    rest.find('}').map(|i| rest[..i].to_string())
}

fn is_tracked(env: &str) -> bool {
    TRACKED_ENVS.contains(&env)
}

/// `Some(rest_after_marker)` if the trimmed line starts a bullet.
fn item_rest_of(trimmed: &str) -> Option<&str> {
    let rest = trimmed.strip_prefix("\\item")?;
    // Reject commands like \itemsep.
    match rest.chars().next() {
        Some(c) if c.is_alphanumeric() => None,
        _ => Some(rest),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

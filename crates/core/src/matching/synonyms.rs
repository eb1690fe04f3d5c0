//! Skill-name normalization, the synonym table, and fuzzy token overlap.
//!
//! Resolution order in the engine is: exact normalized name → synonym
//! variant → token Jaccard above the policy threshold. Everything here is
//! pure and allocation-light; the synonym table is a fixed, documented list.

use std::collections::BTreeSet;

/// Normalizes a skill name for lookup: lowercase, separators to spaces,
/// whitespace collapsed.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_space = true;
    for ch in name.trim().chars() {
        let ch = match ch {
            '-' | '_' | '/' => ' ',
            c => c.to_ascii_lowercase(),
        };
        if ch == ' ' {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(ch);
            last_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Variant → canonical pairs, both sides in normalized form.
///
/// Deliberately small: this covers the abbreviations that show up in job
/// postings and profiles, not a thesaurus.
const SYNONYMS: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("ts", "typescript"),
    ("k8s", "kubernetes"),
    ("golang", "go"),
    ("postgres", "postgresql"),
    ("py", "python"),
    ("reactjs", "react"),
    ("react.js", "react"),
    ("nodejs", "node"),
    ("node.js", "node"),
    ("ml", "machine learning"),
    ("ai", "artificial intelligence"),
    ("ci cd", "continuous integration"),
    ("tf", "terraform"),
    ("gcp", "google cloud"),
];

/// Canonical form of a normalized name, folding known synonyms.
pub fn canonicalize(normalized: &str) -> &str {
    for (variant, canonical) in SYNONYMS {
        if normalized == *variant {
            return canonical;
        }
    }
    normalized
}

/// All normalized variants (including itself) that canonicalize to the
/// same skill as `normalized`.
pub fn variants_of(normalized: &str) -> Vec<String> {
    let canonical = canonicalize(normalized);
    let mut out = vec![canonical.to_string()];
    for (variant, c) in SYNONYMS {
        if *c == canonical {
            out.push((*variant).to_string());
        }
    }
    out
}

/// Lowercased alphanumeric tokens of a phrase, stopwords removed.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    const STOPWORDS: &[&str] = &[
        "a", "an", "and", "as", "at", "be", "by", "for", "in", "is", "of",
        "on", "or", "our", "the", "to", "we", "with", "you", "your",
    ];
    text.split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
        .map(|t| t.to_ascii_lowercase())
        .filter(|t| !t.is_empty() && !STOPWORDS.contains(&t.as_str()))
        .collect()
}

/// Jaccard similarity of two token sets. Empty ∪ empty → 0.0.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let inter = a.intersection(b).count();
    inter as f32 / union as f32
}

/// True if `needle` occurs in `haystack` bounded by non-alphanumerics.
///
/// Both arguments are expected lowercase; used for tagging bullets and for
/// finding skill mentions inside requirement phrases.
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    find_word(haystack, needle).is_some()
}

/// Byte offset of the first word-bounded occurrence of `needle`.
pub fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();
        let left_ok = start == 0
            || !haystack[..start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        let right_ok = end == haystack.len()
            || !haystack[end..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric());
        if left_ok && right_ok {
            return Some(start);
        }
        from = end;
    }
    None
}

//! Serialization back to LaTeX source.
//!
//! Pure concatenation of the raw text every node carries; no reformatting.
//! This is what makes the round-trip invariant hold and keeps untouched
//! fragments byte-identical after edits.

use crate::document::model::{DocNode, DocumentTree};

/// Serializes a tree to LaTeX source text.
pub fn serialize(tree: &DocumentTree) -> String {
    let mut out = String::with_capacity(tree.source_len);
    write_nodes(&tree.nodes, &mut out);
    out
}

fn write_nodes(nodes: &[DocNode], out: &mut String) {
    for node in nodes {
        match node {
            DocNode::Fragment(fragment) => out.push_str(&fragment.raw),
            DocNode::List(list) => {
                out.push_str(&list.begin.raw);
                for item in &list.items {
                    out.push_str(&item.prefix);
                    out.push_str(&item.text);
                    out.push_str(&item.suffix);
                }
                out.push_str(&list.end.raw);
            }
            DocNode::Section(section) => {
                out.push_str(&section.heading.raw);
                write_nodes(&section.children, out);
            }
        }
    }
}

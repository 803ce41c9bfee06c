//! Post-mark marker handling

use crate::tree::{Element, Node};

/// Wrap every occurrence of a marked literal inside a leaf text in a `mark`
/// element, splicing `before`, `mark`, `after` into the parent's children.
///
/// The earliest occurrence in the remaining text is taken first; at the
/// same position the longest literal wins. Leaves without a match are left
/// as they are. Empty literals are ignored.
pub fn mark_tree(nodes: Vec<Node>, marked_texts: &[String]) -> Vec<Node> {
    let needles: Vec<&str> = marked_texts
        .iter()
        .map(String::as_str)
        .filter(|text| !text.is_empty())
        .collect();
    if needles.is_empty() {
        return nodes;
    }
    mark_nodes(nodes, &needles)
}

fn mark_nodes(nodes: Vec<Node>, needles: &[&str]) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(text) => mark_text(&text.value, needles, &mut out),
            Node::Element(element) => out.push(Node::Element(Element {
                children: mark_nodes(element.children, needles),
                ..element
            })),
        }
    }
    out
}

fn mark_text(value: &str, needles: &[&str], out: &mut Vec<Node>) {
    let mut rest = value;
    while let Some((at, len)) = earliest_match(rest, needles) {
        if at > 0 {
            out.push(Node::text(&rest[..at]));
        }
        out.push(Node::mark(&rest[at..at + len]));
        rest = &rest[at + len..];
    }
    if !rest.is_empty() || value.is_empty() {
        out.push(Node::text(rest));
    }
}

fn earliest_match(haystack: &str, needles: &[&str]) -> Option<(usize, usize)> {
    needles
        .iter()
        .filter_map(|needle| haystack.find(needle).map(|at| (at, needle.len())))
        .min_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
}

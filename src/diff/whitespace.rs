//! Whitespace visualization
//!
//! Every space and tab in a leaf text gets its own class-tagged span so the
//! stylesheet can draw a dot or an arrow for it. Each such span is followed
//! by an empty span, keeping cursor and selection behavior identical to the
//! untransformed text.

use crate::tree::{Element, Node};

pub const SPACE_CLASS: &str = "space_char";
pub const TAB_CLASS: &str = "tabulator_char";

/// Apply the transform to every leaf text of `nodes`
pub fn visualize_whitespace(nodes: Vec<Node>) -> Vec<Node> {
    nodes.into_iter().map(visualize_node).collect()
}

fn visualize_node(node: Node) -> Node {
    match node {
        Node::Text(text) => visualize_text(text.value),
        Node::Element(element) => Node::Element(Element {
            children: visualize_whitespace(element.children),
            ..element
        }),
    }
}

fn visualize_text(value: String) -> Node {
    if !value.contains(|c: char| c == ' ' || c == '\t') {
        return Node::text(value);
    }

    let mut children = Vec::new();
    let mut run = String::new();
    for c in value.chars() {
        let class = match c {
            ' ' => SPACE_CLASS,
            '\t' => TAB_CLASS,
            _ => {
                run.push(c);
                continue;
            }
        };
        if !run.is_empty() {
            children.push(Node::text(std::mem::take(&mut run)));
        }
        children.push(Node::span([class], vec![Node::text(c.to_string())]));
        children.push(Node::span(Vec::<String>::new(), vec![Node::text("")]));
    }
    if !run.is_empty() {
        children.push(Node::text(run));
    }

    Node::span(Vec::<String>::new(), children)
}

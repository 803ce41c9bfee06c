//! Highlighted node trees
//!
//! The grammar engine produces a nested tree of [`Node`]s (hast-like: text
//! leaves inside `span` elements carrying class lists). The rest of the
//! pipeline reshapes that tree:
//!
//! ```text
//! engine tree → flatten (class merge, node budget) → group_by_lines → mark → count
//! ```
//!
//! Serialized with serde so the same shape crosses the worker channel and
//! can be dumped as JSON by the CLI.

mod flatten;
mod lines;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use flatten::{flatten, FlatNode, FlattenError};
pub use lines::{group_by_lines, split_lines};

/// Property key flagging a marker element produced by post-marking
pub const DATA_MARKED: &str = "data-marked";
/// Property key carrying the 1-based number of a line element
pub const DATA_LINE_NUMBER: &str = "data-line-number";
/// Class carried by line container elements
pub const LINE_CLASS: &str = "line";
/// Tag used for marker elements
pub const MARK_TAG: &str = "mark";

/// A node of a highlighted tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Text(Text),
    Element(Element),
}

/// Literal source content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub value: String,
}

/// A tagged container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "tagName")]
    pub tag_name: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Element properties: an ordered class list plus free-form `data-*` flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(
        rename = "className",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub class_name: Vec<String>,
    #[serde(flatten)]
    pub data: BTreeMap<String, serde_json::Value>,
}

impl Properties {
    pub fn with_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            class_name: classes.into_iter().map(Into::into).collect(),
            data: BTreeMap::new(),
        }
    }
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(Text {
            value: value.into(),
        })
    }

    /// A `span` element with the given classes and children
    pub fn span<I, S>(classes: I, children: Vec<Node>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Node::Element(Element {
            tag_name: "span".to_string(),
            properties: Properties::with_classes(classes),
            children,
        })
    }

    /// A `mark` element wrapping `value`, flagged with `data-marked`
    pub fn mark(value: impl Into<String>) -> Self {
        let mut properties = Properties::default();
        properties
            .data
            .insert(DATA_MARKED.to_string(), serde_json::Value::Bool(true));
        Node::Element(Element {
            tag_name: MARK_TAG.to_string(),
            properties,
            children: vec![Node::text(value)],
        })
    }

    /// A line container (`span.line`) numbered `number`
    pub fn line(number: usize, children: Vec<Node>) -> Self {
        let mut properties = Properties::with_classes([LINE_CLASS]);
        properties
            .data
            .insert(DATA_LINE_NUMBER.to_string(), serde_json::Value::from(number));
        Node::Element(Element {
            tag_name: "span".to_string(),
            properties,
            children,
        })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(&text.value),
            Node::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// True for a `mark` element produced by post-marking
    pub fn is_marker(&self) -> bool {
        match self {
            Node::Element(element) => {
                element.tag_name == MARK_TAG && element.properties.data.contains_key(DATA_MARKED)
            }
            Node::Text(_) => false,
        }
    }

    /// Concatenation of every leaf text below (and including) this node
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        walk(std::slice::from_ref(self), &mut |node, _| {
            if let Node::Text(text) = node {
                out.push_str(&text.value);
            }
        });
        out
    }
}

impl Element {
    /// The `data-line-number` of a line element
    pub fn line_number(&self) -> Option<u64> {
        self.properties
            .data
            .get(DATA_LINE_NUMBER)
            .and_then(serde_json::Value::as_u64)
    }
}

/// Depth-first pre-order traversal; the callback receives each node and its depth
pub fn walk<'a, F>(nodes: &'a [Node], visit: &mut F)
where
    F: FnMut(&'a Node, usize),
{
    fn go<'a, F>(nodes: &'a [Node], depth: usize, visit: &mut F)
    where
        F: FnMut(&'a Node, usize),
    {
        for node in nodes {
            visit(node, depth);
            if let Node::Element(element) = node {
                go(&element.children, depth + 1, visit);
            }
        }
    }
    go(nodes, 0, visit);
}

/// Number of leaf `Text` nodes
pub fn count_leaves(nodes: &[Node]) -> usize {
    let mut count = 0;
    walk(nodes, &mut |node, _| {
        if matches!(node, Node::Text(_)) {
            count += 1;
        }
    });
    count
}

/// Budget measure of a finished tree: leaf texts plus marker elements
pub fn count_nodes(nodes: &[Node]) -> usize {
    let mut count = 0;
    walk(nodes, &mut |node, _| {
        if matches!(node, Node::Text(_)) || node.is_marker() {
            count += 1;
        }
    });
    count
}

/// Concatenated text of a node list
pub fn text_of(nodes: &[Node]) -> String {
    nodes.iter().map(Node::text_content).collect()
}

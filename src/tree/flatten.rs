//! Tree flattening
//!
//! Collapses a nested highlight tree into a flat sequence where every leaf
//! carries the merged class list of all its ancestors. The walk counts what
//! it emits and aborts as soon as the count passes the node limit, so a
//! pathological input never gets fully materialized.

use thiserror::Error;

use super::Node;

/// A flattened leaf: bare text, or a single span with merged ancestor classes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatNode {
    Text(String),
    Span { classes: Vec<String>, text: String },
}

impl FlatNode {
    pub fn text(&self) -> &str {
        match self {
            FlatNode::Text(text) => text,
            FlatNode::Span { text, .. } => text,
        }
    }

    pub fn classes(&self) -> &[String] {
        match self {
            FlatNode::Text(_) => &[],
            FlatNode::Span { classes, .. } => classes,
        }
    }

    pub fn is_bare(&self) -> bool {
        matches!(self, FlatNode::Text(_))
    }

    /// Same shape (and classes) with different text
    pub fn with_text(&self, text: impl Into<String>) -> FlatNode {
        match self {
            FlatNode::Text(_) => FlatNode::Text(text.into()),
            FlatNode::Span { classes, .. } => FlatNode::Span {
                classes: classes.clone(),
                text: text.into(),
            },
        }
    }

    pub fn into_node(self) -> Node {
        match self {
            FlatNode::Text(text) => Node::text(text),
            FlatNode::Span { classes, text } => Node::span(classes, vec![Node::text(text)]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlattenError {
    #[error("node limit of {limit} reached. Flattened {count} nodes so far.")]
    NodeLimitExceeded { limit: usize, count: usize },
}

/// Flatten `nodes` depth-first. `node_limit: None` disables the budget.
pub fn flatten(nodes: &[Node], node_limit: Option<usize>) -> Result<Vec<FlatNode>, FlattenError> {
    let mut flattener = Flattener {
        limit: node_limit,
        out: Vec::new(),
    };
    flattener.visit(nodes, &[])?;
    Ok(flattener.out)
}

struct Flattener {
    limit: Option<usize>,
    out: Vec<FlatNode>,
}

impl Flattener {
    fn visit(&mut self, nodes: &[Node], context: &[String]) -> Result<(), FlattenError> {
        for node in nodes {
            match node {
                Node::Text(text) => self.emit(context, &text.value)?,
                Node::Element(element) => {
                    let merged = merge_classes(context, &element.properties.class_name);
                    self.visit(&element.children, &merged)?;
                }
            }
        }
        Ok(())
    }

    fn emit(&mut self, context: &[String], text: &str) -> Result<(), FlattenError> {
        let node = if context.is_empty() {
            FlatNode::Text(text.to_string())
        } else {
            FlatNode::Span {
                classes: context.to_vec(),
                text: text.to_string(),
            }
        };
        self.out.push(node);

        if let Some(limit) = self.limit {
            if self.out.len() > limit {
                return Err(FlattenError::NodeLimitExceeded {
                    limit,
                    count: self.out.len(),
                });
            }
        }
        Ok(())
    }
}

/// Ancestor classes followed by the new ones not seen yet
fn merge_classes(context: &[String], classes: &[String]) -> Vec<String> {
    let mut merged = context.to_vec();
    for class in classes {
        if !merged.contains(class) {
            merged.push(class.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::count_leaves;

    fn sample() -> Vec<Node> {
        vec![
            Node::text("let "),
            Node::span(
                ["token", "function"],
                vec![
                    Node::text("f"),
                    Node::span(["token", "punctuation"], vec![Node::text("(")]),
                ],
            ),
            Node::span(["token"], vec![]),
        ]
    }

    #[test]
    fn test_one_flat_node_per_leaf() {
        let tree = sample();
        let flat = flatten(&tree, None).unwrap();
        assert_eq!(flat.len(), count_leaves(&tree));
    }

    #[test]
    fn test_classes_are_merged_and_deduplicated() {
        let flat = flatten(&sample(), None).unwrap();
        assert_eq!(flat[0], FlatNode::Text("let ".to_string()));
        assert_eq!(flat[1].classes(), ["token", "function"]);
        assert_eq!(flat[2].classes(), ["token", "function", "punctuation"]);
        assert_eq!(flat[2].text(), "(");
    }

    #[test]
    fn test_limit_aborts_early() {
        let err = flatten(&sample(), Some(1)).unwrap_err();
        assert_eq!(err, FlattenError::NodeLimitExceeded { limit: 1, count: 2 });
        assert!(err.to_string().contains("node limit of 1"));
    }

    #[test]
    fn test_limit_exactly_met_is_fine() {
        assert_eq!(flatten(&sample(), Some(3)).unwrap().len(), 3);
    }
}

//! Line grouping
//!
//! Turns a flat node sequence into numbered line containers. Node texts are
//! split at `\n`; a class spanning a line break ends up on both fragments.

use super::flatten::{flatten, FlatNode, FlattenError};
use super::Node;

/// Flatten `nodes` (under `node_limit`) and group the result into
/// `span.line` elements numbered 1, 2, 3, ... without gaps.
///
/// The newline stays attached to the fragment it terminates. Content after
/// the last newline gets its own line; a trailing newline does not add an
/// empty one.
pub fn group_by_lines(nodes: &[Node], node_limit: Option<usize>) -> Result<Vec<Node>, FlattenError> {
    let flat = flatten(nodes, node_limit)?;

    let mut lines = Vec::new();
    let mut current: Vec<Node> = Vec::new();

    for node in flat {
        let segments = split_keeping_newlines(node.text());
        let last = segments.len() - 1;

        for (i, segment) in segments.into_iter().enumerate() {
            // Empty bare text never renders; an empty class-carrying span is
            // kept unless the split itself produced it.
            let artifact = segment.is_empty() && (node.is_bare() || last > 0);
            if !artifact {
                current.push(node.with_text(segment).into_node());
            }
            if i < last {
                let number = lines.len() + 1;
                lines.push(Node::line(number, std::mem::take(&mut current)));
            }
        }
    }

    if !current.is_empty() {
        let number = lines.len() + 1;
        lines.push(Node::line(number, current));
    }

    Ok(lines)
}

/// Split flat nodes into per-line fragment lists, dropping the newlines.
///
/// Always yields one list per line of the input text (k newlines → k + 1
/// lists, empty lines included). Nodes that were empty before splitting
/// (zero-width spans) are preserved.
pub fn split_lines(nodes: &[FlatNode]) -> Vec<Vec<FlatNode>> {
    let mut lines = vec![Vec::new()];

    for node in nodes {
        let segments: Vec<&str> = node.text().split('\n').collect();
        let last = segments.len() - 1;

        for (i, segment) in segments.iter().enumerate() {
            if !segment.is_empty() || last == 0 {
                if let Some(line) = lines.last_mut() {
                    line.push(node.with_text(*segment));
                }
            }
            if i < last {
                lines.push(Vec::new());
            }
        }
    }

    lines
}

/// `"a\nb"` → `["a\n", "b"]`, `"a\n"` → `["a\n", ""]`, `""` → `[""]`
fn split_keeping_newlines(text: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = text.split_inclusive('\n').collect();
    if text.is_empty() || text.ends_with('\n') {
        segments.push("");
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_texts(lines: &[Node]) -> Vec<String> {
        lines.iter().map(Node::text_content).collect()
    }

    #[test]
    fn test_split_keeping_newlines() {
        assert_eq!(split_keeping_newlines("a\nb"), vec!["a\n", "b"]);
        assert_eq!(split_keeping_newlines("a\n"), vec!["a\n", ""]);
        assert_eq!(split_keeping_newlines(""), vec![""]);
        assert_eq!(split_keeping_newlines("\n\n"), vec!["\n", "\n", ""]);
    }

    #[test]
    fn test_two_lines() {
        let lines = group_by_lines(&[Node::text("a\nb")], None).unwrap();
        assert_eq!(line_texts(&lines), vec!["a\n", "b"]);
        assert_eq!(lines[0].as_element().unwrap().line_number(), Some(1));
        assert_eq!(lines[1].as_element().unwrap().line_number(), Some(2));
    }

    #[test]
    fn test_trailing_newline_adds_no_line() {
        let lines = group_by_lines(&[Node::text("a\nb\n")], None).unwrap();
        assert_eq!(line_texts(&lines), vec!["a\n", "b\n"]);
    }

    #[test]
    fn test_empty_lines_are_kept() {
        let lines = group_by_lines(&[Node::text("a\n\n\nb")], None).unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(line_texts(&lines), vec!["a\n", "\n", "\n", "b"]);
    }

    #[test]
    fn test_class_spanning_break_kept_on_both_fragments() {
        let tree = vec![
            Node::text("x "),
            Node::span(["token", "comment"], vec![Node::text("/*\n*/")]),
        ];
        let lines = group_by_lines(&tree, None).unwrap();
        assert_eq!(lines.len(), 2);

        let first = &lines[0].as_element().unwrap().children;
        let second = &lines[1].as_element().unwrap().children;
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].as_element().unwrap().properties.class_name, ["token", "comment"]);
        assert_eq!(first[1].text_content(), "/*\n");
        assert_eq!(second[0].as_element().unwrap().properties.class_name, ["token", "comment"]);
        assert_eq!(second[0].text_content(), "*/");
    }

    #[test]
    fn test_empty_span_kept_empty_text_dropped() {
        let tree = vec![
            Node::text(""),
            Node::span(["zero"], vec![Node::text("")]),
            Node::text("a"),
        ];
        let lines = group_by_lines(&tree, None).unwrap();
        let children = &lines[0].as_element().unwrap().children;
        assert_eq!(children.len(), 2);
        assert!(children[0].as_element().is_some());
    }

    #[test]
    fn test_split_lines_counts_every_line() {
        let flat = vec![
            FlatNode::Text("a\n".to_string()),
            FlatNode::Span {
                classes: vec!["s".to_string()],
                text: "\nb".to_string(),
            },
        ];
        let lines = split_lines(&flat);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], vec![FlatNode::Text("a".to_string())]);
        assert!(lines[1].is_empty());
        assert_eq!(lines[2][0].text(), "b");
        assert_eq!(lines[2][0].classes(), ["s"]);
    }
}

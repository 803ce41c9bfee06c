//! Pre-strip marker handling

use serde::{Deserialize, Serialize};

use crate::tree::Node;

/// Delimiters around a marked span, e.g. `<|[[--` / `--]]|>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerBounds {
    pub start: String,
    pub end: String,
}

impl MarkerBounds {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl Default for MarkerBounds {
    /// Delimiters emitted by the search backend's highlighter
    fn default() -> Self {
        Self::new("<|[[--", "--]]|>")
    }
}

/// A literal to swap for its marked rendering in the fallback output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replacement {
    pub text_to_replace: String,
    pub replacement: Node,
    pub replace_all: bool,
}

impl Replacement {
    pub fn mark_all(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            replacement: Node::mark(text.clone()),
            text_to_replace: text,
            replace_all: true,
        }
    }
}

/// Delimiter-free text plus the replacements extracted from it
#[derive(Debug, Clone, PartialEq)]
pub struct Stripped {
    pub text: String,
    /// Deduplicated, longest text first
    pub replacements: Vec<Replacement>,
}

impl Stripped {
    /// The extracted literals, in replacement order
    pub fn marked_texts(&self) -> Vec<String> {
        self.replacements
            .iter()
            .map(|r| r.text_to_replace.clone())
            .collect()
    }

    /// Plain, non-highlighted rendering with the matches marked
    pub fn fallback(&self) -> Vec<Node> {
        render_fallback(&self.text, &self.replacements)
    }
}

/// Remove every `bounds` delimiter from `text`, collecting the enclosed spans.
///
/// An unterminated start delimiter and stray end delimiters are removed too,
/// so no delimiter text survives.
pub fn strip_markers(text: &str, bounds: &MarkerBounds) -> Stripped {
    if bounds.start.is_empty() || bounds.end.is_empty() {
        return Stripped {
            text: text.to_string(),
            replacements: Vec::new(),
        };
    }

    let mut marked: Vec<String> = Vec::new();
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find(&bounds.start) {
        out.push_str(&strip_all(&rest[..open], bounds));
        let inner_start = open + bounds.start.len();
        match rest[inner_start..].find(&bounds.end) {
            Some(close) => {
                let inner = &rest[inner_start..inner_start + close];
                if !inner.is_empty() && !marked.iter().any(|m| m == inner) {
                    marked.push(inner.to_string());
                }
                out.push_str(inner);
                rest = &rest[inner_start + close + bounds.end.len()..];
            }
            None => {
                rest = &rest[inner_start..];
                break;
            }
        }
    }
    out.push_str(&strip_all(rest, bounds));

    // Longest first: a shorter literal must not eat the prefix of a longer one.
    marked.sort_by(|a, b| b.len().cmp(&a.len()));

    Stripped {
        text: out,
        replacements: marked.into_iter().map(Replacement::mark_all).collect(),
    }
}

fn strip_all(text: &str, bounds: &MarkerBounds) -> String {
    text.replace(&bounds.start, "").replace(&bounds.end, "")
}

enum Segment {
    Plain(String),
    Replaced(Node),
}

/// Render `text` unhighlighted, substituting each replacement's literal with
/// its replacement node. Replacements apply in order; a later one only sees
/// text no earlier one consumed.
pub fn render_fallback(text: &str, replacements: &[Replacement]) -> Vec<Node> {
    let mut segments = vec![Segment::Plain(text.to_string())];

    for replacement in replacements {
        let needle = replacement.text_to_replace.as_str();
        if needle.is_empty() {
            continue;
        }

        let mut replaced_once = false;
        let mut next = Vec::with_capacity(segments.len());
        for segment in segments {
            let plain = match segment {
                Segment::Plain(plain) if !(replaced_once && !replacement.replace_all) => plain,
                other => {
                    next.push(other);
                    continue;
                }
            };

            let mut rest = plain.as_str();
            while let Some(at) = rest.find(needle) {
                if replaced_once && !replacement.replace_all {
                    break;
                }
                if at > 0 {
                    next.push(Segment::Plain(rest[..at].to_string()));
                }
                next.push(Segment::Replaced(replacement.replacement.clone()));
                replaced_once = true;
                rest = &rest[at + needle.len()..];
            }
            if !rest.is_empty() {
                next.push(Segment::Plain(rest.to_string()));
            }
        }
        segments = next;
    }

    segments
        .into_iter()
        .map(|segment| match segment {
            Segment::Plain(text) => Node::text(text),
            Segment::Replaced(node) => node,
        })
        .collect()
}

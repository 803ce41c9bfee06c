//! Tree-sitter grammar engine
//!
//! Owns the registry of compiled grammars (parser + highlight query) for the
//! lifetime of the worker. A grammar's query is layered on the queries of its
//! registered dependencies, the same way TypeScript highlighting builds on
//! the JavaScript patterns and C++ on the C ones.

use std::collections::HashMap;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Parser, Query, QueryCursor, Tree};

use super::engine::{plain_text_tree, GrammarEngine, GrammarError};
use super::highlights::token_classes;
use super::languages::PLAIN_TEXT;
use super::theme::Theme;
use crate::tree::Node;

/// Grammar ids the engine knows how to build
pub const BUILTIN_GRAMMARS: &[&str] = &[
    "bash",
    "c",
    "cpp",
    "css",
    "go",
    "html",
    "ini",
    "java",
    "javascript",
    "json",
    "php",
    "python",
    "rust",
    "scheme",
    "toml",
    "tsx",
    "typescript",
    "xml",
];

fn builtin_grammar(id: &str) -> Option<(Language, &'static str)> {
    let grammar: (Language, &'static str) = match id {
        // Web stack
        "html" => (
            tree_sitter_html::LANGUAGE.into(),
            tree_sitter_html::HIGHLIGHTS_QUERY,
        ),
        "css" => (
            tree_sitter_css::LANGUAGE.into(),
            tree_sitter_css::HIGHLIGHTS_QUERY,
        ),
        "javascript" => (
            tree_sitter_javascript::LANGUAGE.into(),
            tree_sitter_javascript::HIGHLIGHT_QUERY,
        ),
        // TypeScript only adds to the JavaScript patterns (see dependency table)
        "typescript" => (
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            tree_sitter_typescript::HIGHLIGHTS_QUERY,
        ),
        "tsx" => (
            tree_sitter_typescript::LANGUAGE_TSX.into(),
            tree_sitter_typescript::HIGHLIGHTS_QUERY,
        ),
        "json" => (
            tree_sitter_json::LANGUAGE.into(),
            tree_sitter_json::HIGHLIGHTS_QUERY,
        ),
        "toml" => (
            tree_sitter_toml_ng::LANGUAGE.into(),
            tree_sitter_toml_ng::HIGHLIGHTS_QUERY,
        ),
        // Common
        "rust" => (
            tree_sitter_rust::LANGUAGE.into(),
            tree_sitter_rust::HIGHLIGHTS_QUERY,
        ),
        "python" => (
            tree_sitter_python::LANGUAGE.into(),
            tree_sitter_python::HIGHLIGHTS_QUERY,
        ),
        "go" => (
            tree_sitter_go::LANGUAGE.into(),
            tree_sitter_go::HIGHLIGHTS_QUERY,
        ),
        "php" => (
            tree_sitter_php::LANGUAGE_PHP.into(),
            tree_sitter_php::HIGHLIGHTS_QUERY,
        ),
        // Extended (some crates export HIGHLIGHT_QUERY singular)
        "c" => (tree_sitter_c::LANGUAGE.into(), tree_sitter_c::HIGHLIGHT_QUERY),
        "cpp" => (
            tree_sitter_cpp::LANGUAGE.into(),
            tree_sitter_cpp::HIGHLIGHT_QUERY,
        ),
        "java" => (
            tree_sitter_java::LANGUAGE.into(),
            tree_sitter_java::HIGHLIGHTS_QUERY,
        ),
        "bash" => (
            tree_sitter_bash::LANGUAGE.into(),
            tree_sitter_bash::HIGHLIGHT_QUERY,
        ),
        // Specialized
        "scheme" => (
            tree_sitter_racket::LANGUAGE.into(),
            tree_sitter_racket::HIGHLIGHTS_QUERY,
        ),
        "ini" => (
            tree_sitter_ini::LANGUAGE.into(),
            tree_sitter_ini::HIGHLIGHTS_QUERY,
        ),
        "xml" => (
            tree_sitter_xml::LANGUAGE_XML.into(),
            tree_sitter_xml::XML_HIGHLIGHT_QUERY,
        ),
        _ => return None,
    };
    Some(grammar)
}

/// A registered grammar
struct Grammar {
    parser: Parser,
    query: Query,
    /// Full query source including layered dependency patterns
    query_source: String,
}

/// Grammar registry and highlighter backed by tree-sitter.
///
/// Parsers are `!Sync`; the engine lives on the worker thread.
#[derive(Default)]
pub struct TreeSitterEngine {
    grammars: HashMap<String, Grammar>,
    theme: Theme,
}

impl TreeSitterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of all registered grammars, sorted
    pub fn registered(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.grammars.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl GrammarEngine for TreeSitterEngine {
    fn is_registered(&self, id: &str) -> bool {
        id == PLAIN_TEXT || self.grammars.contains_key(id)
    }

    fn register(&mut self, id: &str, dependencies: &[String]) -> Result<(), GrammarError> {
        let (language, own_query) =
            builtin_grammar(id).ok_or_else(|| GrammarError::UnknownGrammar(id.to_string()))?;

        let mut query_source = String::new();
        for dependency in dependencies {
            match self.grammars.get(dependency) {
                Some(base) => {
                    query_source.push_str(&base.query_source);
                    query_source.push('\n');
                }
                None => tracing::debug!(
                    "Dependency {} of {} not registered, highlighting without it",
                    dependency,
                    id
                ),
            }
        }
        query_source.push_str(own_query);

        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| GrammarError::Language {
                id: id.to_string(),
                message: e.to_string(),
            })?;

        let query = Query::new(&language, &query_source).map_err(|e| GrammarError::Query {
            id: id.to_string(),
            message: format!("{:?}", e),
        })?;

        self.grammars.insert(
            id.to_string(),
            Grammar {
                parser,
                query,
                query_source,
            },
        );
        Ok(())
    }

    fn highlight(&mut self, text: &str, id: &str) -> Result<Vec<Node>, GrammarError> {
        if id == PLAIN_TEXT {
            return Ok(plain_text_tree(text));
        }

        let grammar = self
            .grammars
            .get_mut(id)
            .ok_or_else(|| GrammarError::NotRegistered(id.to_string()))?;

        let tree = grammar
            .parser
            .parse(text, None)
            .ok_or_else(|| GrammarError::Parse(id.to_string()))?;

        let spans = capture_spans(&grammar.query, &tree, text, &self.theme);
        tracing::trace!("{} highlight: {} capture spans", id, spans.len());
        Ok(build_tree(text, spans))
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}

/// A highlighted byte range
#[derive(Debug, Clone, PartialEq, Eq)]
struct CaptureSpan {
    start: usize,
    end: usize,
    classes: Vec<String>,
}

/// Run the highlight query and collect capture ranges, outermost first
fn capture_spans(query: &Query, tree: &Tree, text: &str, theme: &Theme) -> Vec<CaptureSpan> {
    let mut cursor = QueryCursor::new();
    let names = query.capture_names();
    let mut spans = Vec::new();

    let mut captures = cursor.captures(query, tree.root_node(), text.as_bytes());
    while let Some((query_match, capture_idx)) = captures.next() {
        let capture = &query_match.captures[*capture_idx];
        let Some(classes) = token_classes(names[capture.index as usize]) else {
            continue;
        };

        let range = capture.node.byte_range();
        if range.start >= range.end
            || !text.is_char_boundary(range.start)
            || !text.is_char_boundary(range.end)
        {
            continue;
        }

        spans.push(CaptureSpan {
            start: range.start,
            end: range.end,
            classes: theme.apply(classes),
        });
    }

    // Stable: for identical ranges the first capture (first pattern) wins.
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
    spans.dedup_by(|later, earlier| later.start == earlier.start && later.end == earlier.end);
    spans
}

struct OpenSpan {
    end: usize,
    classes: Vec<String>,
    children: Vec<Node>,
}

/// Nest capture spans by containment; the leaves concatenate to `text`.
/// Spans that cross the end of their enclosing span are dropped.
fn build_tree(text: &str, spans: Vec<CaptureSpan>) -> Vec<Node> {
    let mut root: Vec<Node> = Vec::new();
    let mut stack: Vec<OpenSpan> = Vec::new();
    let mut pos = 0;

    for span in spans {
        while stack.last().is_some_and(|top| top.end <= span.start) {
            close_top(text, &mut stack, &mut root, &mut pos);
        }
        if span.start < pos || stack.last().is_some_and(|top| span.end > top.end) {
            continue;
        }

        push_text(text, pos, span.start, container(&mut stack, &mut root));
        pos = span.start;
        stack.push(OpenSpan {
            end: span.end,
            classes: span.classes,
            children: Vec::new(),
        });
    }

    while !stack.is_empty() {
        close_top(text, &mut stack, &mut root, &mut pos);
    }
    push_text(text, pos, text.len(), &mut root);
    root
}

fn close_top(text: &str, stack: &mut Vec<OpenSpan>, root: &mut Vec<Node>, pos: &mut usize) {
    let Some(mut top) = stack.pop() else {
        return;
    };
    push_text(text, *pos, top.end, &mut top.children);
    *pos = top.end;
    let node = Node::span(top.classes, top.children);
    container(stack, root).push(node);
}

fn container<'a>(stack: &'a mut [OpenSpan], root: &'a mut Vec<Node>) -> &'a mut Vec<Node> {
    match stack.last_mut() {
        Some(open) => &mut open.children,
        None => root,
    }
}

fn push_text(text: &str, from: usize, to: usize, out: &mut Vec<Node>) {
    if from < to {
        out.push(Node::text(&text[from..to]));
    }
}

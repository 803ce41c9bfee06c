//! Grammar engine seam
//!
//! The worker only needs three things from a highlighting engine: know what
//! is registered, register a grammar, and turn text into a node tree. The
//! tree-sitter engine implements this; tests plug in their own.

use thiserror::Error;

use super::theme::Theme;
use crate::tree::Node;

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("unknown grammar: {0}")]
    UnknownGrammar(String),
    #[error("grammar {0} is not registered")]
    NotRegistered(String),
    #[error("failed to set language for {id}: {message}")]
    Language { id: String, message: String },
    #[error("failed to compile highlight query for {id}: {message}")]
    Query { id: String, message: String },
    #[error("failed to parse {0} source")]
    Parse(String),
}

pub trait GrammarEngine {
    /// True once `id` has been registered successfully
    fn is_registered(&self, id: &str) -> bool;

    /// Register grammar `id`. `dependencies` lists its direct dependencies;
    /// those that are already registered may be layered under it.
    fn register(&mut self, id: &str, dependencies: &[String]) -> Result<(), GrammarError>;

    /// Highlight `text` with registered grammar `id`
    fn highlight(&mut self, text: &str, id: &str) -> Result<Vec<Node>, GrammarError>;

    /// Replace the class remap table
    fn set_theme(&mut self, theme: Theme);
}

/// Tree for text that gets no highlighting
pub fn plain_text_tree(text: &str) -> Vec<Node> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![Node::text(text)]
    }
}

//! Two-sided hunk tokenization
//!
//! The old side (normal + deleted lines) and the new side (normal + inserted
//! lines) are each highlighted as one text, so multi-line constructs keep
//! their coloring, then cut back into per-line token lists. Both sides render
//! at the same time, so they share one node budget.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hunk::Hunk;
use super::whitespace::visualize_whitespace;
use crate::syntax::{GrammarEngine, GrammarError};
use crate::tree::{flatten, split_lines, FlatNode, FlattenError, Node};

/// Default budget for both sides of a diff together.
///
/// With whitespace visualization on, a run of non-whitespace characters
/// counts as one leaf rather than one node per character, so this budget
/// admits noticeably larger hunks than a per-character wrapping would.
pub const TOKENIZE_NODE_LIMIT: usize = 600;

/// Per-line token lists; `old[i]` is the i-th line of the old side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffTokens {
    pub old: Vec<Vec<Node>>,
    pub new: Vec<Vec<Node>>,
}

#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("Node limit ({limit}) reached. Current nodes: {count}")]
    NodeLimitExceeded { limit: usize, count: usize },
    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

/// Options of one tokenize run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizeOptions {
    pub whitespace: bool,
    pub node_limit: usize,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        Self {
            whitespace: false,
            node_limit: TOKENIZE_NODE_LIMIT,
        }
    }
}

/// Highlight both sides of `hunks` with registered grammar `language`
pub fn tokenize_hunks<E: GrammarEngine + ?Sized>(
    engine: &mut E,
    hunks: &[Hunk],
    language: &str,
    options: TokenizeOptions,
) -> Result<DiffTokens, TokenizeError> {
    let old_lines: Vec<&str> = hunks.iter().flat_map(Hunk::old_side).collect();
    let new_lines: Vec<&str> = hunks.iter().flat_map(Hunk::new_side).collect();

    let mut used = 0;
    let old = tokenize_side(engine, &old_lines, language, options, &mut used)?;
    let new = tokenize_side(engine, &new_lines, language, options, &mut used)?;

    tracing::debug!(
        "Tokenized {} old / {} new lines into {} nodes",
        old.len(),
        new.len(),
        used
    );
    Ok(DiffTokens { old, new })
}

fn tokenize_side<E: GrammarEngine + ?Sized>(
    engine: &mut E,
    lines: &[&str],
    language: &str,
    options: TokenizeOptions,
    used: &mut usize,
) -> Result<Vec<Vec<Node>>, TokenizeError> {
    if lines.is_empty() {
        return Ok(Vec::new());
    }

    let text = lines.join("\n");
    let mut tree = engine.highlight(&text, language)?;
    if options.whitespace {
        tree = visualize_whitespace(tree);
    }

    let remaining = options.node_limit.saturating_sub(*used);
    let flat = flatten(&tree, Some(remaining)).map_err(|e| match e {
        FlattenError::NodeLimitExceeded { count, .. } => TokenizeError::NodeLimitExceeded {
            limit: options.node_limit,
            count: *used + count,
        },
    })?;
    *used += flat.len();

    Ok(split_lines(&flat)
        .into_iter()
        .map(|line| line.into_iter().map(FlatNode::into_node).collect())
        .collect())
}

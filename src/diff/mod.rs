//! Diff hunk tokenization
//!
//! Highlights the old and new sides of diff hunks for side-by-side or
//! unified rendering, with optional whitespace visualization and a node
//! budget of its own.

mod hunk;
mod tokenize;
mod whitespace;

pub use hunk::{parse_unified_diff, Change, ChangeKind, DiffParseError, Hunk};
pub use tokenize::{tokenize_hunks, DiffTokens, TokenizeError, TokenizeOptions, TOKENIZE_NODE_LIMIT};
pub use whitespace::{visualize_whitespace, SPACE_CLASS, TAB_CLASS};

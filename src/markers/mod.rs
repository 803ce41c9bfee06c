//! Search-match markers
//!
//! Two separate strategies, picked by who controls the text:
//!
//! - [`strip_markers`] (pre-strip): the caller owns raw text with delimited
//!   matches. Delimiters are removed before anything reaches a grammar, and
//!   the extracted matches become a replacement list for the plain fallback
//!   rendering (and the literals to post-mark).
//! - [`mark_tree`] (post-mark): the literals are known up front and the
//!   highlighted tree is patched leaf by leaf after highlighting.
//!
//! Post-marking only sees one leaf at a time: a literal split across two
//! grammar tokens (e.g. `a.b` tokenized as `a`, `.`, `b`) is not marked.

mod mark;
mod strip;

pub use mark::mark_tree;
pub use strip::{render_fallback, strip_markers, MarkerBounds, Replacement, Stripped};

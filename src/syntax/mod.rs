//! Syntax highlighting module
//!
//! Provides tree-sitter based highlighting that produces node trees:
//! - Alias and dependency tables for grammar ids
//! - Lazy, dependency-first grammar loading
//! - Capture → token class mapping with theme remapping
//!
//! ## Architecture
//!
//! ```text
//! language alias → LanguageLoader (deps first, idempotent)
//!               → GrammarEngine::highlight → nested Node tree
//! ```

mod engine;
mod highlights;
mod languages;
mod loader;
mod parser;
mod theme;

pub use engine::{plain_text_tree, GrammarEngine, GrammarError};
pub use highlights::{resolve_highlight_name, token_classes, HIGHLIGHT_NAMES, TOKEN_CLASS};
pub use languages::{LanguageTables, PLAIN_TEXT};
pub use loader::{LanguageLoader, LoadReport};
pub use parser::{TreeSitterEngine, BUILTIN_GRAMMARS};
pub use theme::Theme;

//! Syntax highlighting worker
//!
//! Turns source text and diff hunks into class-annotated node trees on a
//! dedicated thread, under a hard node budget, with optional line grouping
//! and search-match marking.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod diff;
pub mod markers;
pub mod syntax;
pub mod tracing;
pub mod tree;
pub mod worker;

// Re-export commonly used types
pub use config::WorkerConfig;
pub use syntax::{GrammarEngine, Theme, TreeSitterEngine};
pub use tree::Node;
pub use worker::{HighlightOptions, HighlightSlot, HighlightState, SyntaxClient};

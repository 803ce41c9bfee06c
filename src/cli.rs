//! Command-line argument parsing
//!
//! Supports:
//! - Highlighting a file (optionally line-grouped and marked)
//! - Tokenizing the hunks of a unified diff
//! - Listing built-in grammars and language tables

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::WorkerConfig;
use crate::markers::MarkerBounds;

/// Syntax highlighting off the main thread, under a node budget
#[derive(Parser, Debug)]
#[command(name = "syntax-worker", version, about = "Syntax highlighting worker")]
pub struct CliArgs {
    /// Config file (default: ~/.config/syntax-worker/config.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Highlight a source file and print the node tree as JSON
    Highlight(HighlightArgs),
    /// Tokenize the hunks of a unified diff and print per-line tokens as JSON
    Tokenize(TokenizeArgs),
    /// List built-in grammars, aliases and dependencies
    Languages,
}

#[derive(Args, Debug)]
pub struct HighlightArgs {
    /// File to highlight (`-` reads stdin)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Language or alias (default: from the file extension)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Group the result into numbered line elements
    #[arg(long)]
    pub group_by_line: bool,

    /// Node budget (default: from config)
    #[arg(long, value_name = "N", conflicts_with = "no_limit")]
    pub node_limit: Option<usize>,

    /// Disable the node budget
    #[arg(long)]
    pub no_limit: bool,

    /// Mark every occurrence of TEXT after highlighting (repeatable)
    #[arg(long = "mark", value_name = "TEXT")]
    pub marks: Vec<String>,

    /// Strip `<|[[--`/`--]]|>` delimited marks before highlighting
    #[arg(long)]
    pub markers: bool,

    /// Custom start delimiter for stripped marks
    #[arg(long, value_name = "S", requires = "marker_end")]
    pub marker_start: Option<String>,

    /// Custom end delimiter for stripped marks
    #[arg(long, value_name = "E", requires = "marker_start")]
    pub marker_end: Option<String>,
}

impl HighlightArgs {
    /// Effective node budget given the loaded config
    pub fn node_limit(&self, config: &WorkerConfig) -> Option<usize> {
        if self.no_limit {
            None
        } else {
            self.node_limit.or(config.node_limit)
        }
    }

    /// Delimiters to strip before highlighting, if any were requested
    pub fn marker_bounds(&self) -> Option<MarkerBounds> {
        match (&self.marker_start, &self.marker_end) {
            (Some(start), Some(end)) => Some(MarkerBounds::new(start.as_str(), end.as_str())),
            _ if self.markers => Some(MarkerBounds::default()),
            _ => None,
        }
    }
}

#[derive(Args, Debug)]
pub struct TokenizeArgs {
    /// Unified diff to tokenize (`-` reads stdin)
    #[arg(value_name = "DIFF")]
    pub diff: PathBuf,

    /// Language or alias of the diffed file
    #[arg(short, long)]
    pub language: String,

    /// Visualize spaces and tabs
    #[arg(long)]
    pub whitespace: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_highlight_defaults() {
        let args = parse(&["syntax-worker", "highlight", "main.rs"]);
        let Command::Highlight(highlight) = args.command else {
            panic!("expected highlight");
        };
        assert_eq!(highlight.file, PathBuf::from("main.rs"));
        assert!(highlight.marker_bounds().is_none());
        assert_eq!(
            highlight.node_limit(&WorkerConfig::default()),
            Some(crate::config::DEFAULT_NODE_LIMIT)
        );
    }

    #[test]
    fn test_node_limit_overrides() {
        let args = parse(&["syntax-worker", "highlight", "a", "--node-limit", "5"]);
        let Command::Highlight(highlight) = args.command else {
            panic!("expected highlight");
        };
        assert_eq!(highlight.node_limit(&WorkerConfig::default()), Some(5));

        let args = parse(&["syntax-worker", "highlight", "a", "--no-limit"]);
        let Command::Highlight(highlight) = args.command else {
            panic!("expected highlight");
        };
        assert_eq!(highlight.node_limit(&WorkerConfig::default()), None);

        assert!(CliArgs::try_parse_from([
            "syntax-worker",
            "highlight",
            "a",
            "--no-limit",
            "--node-limit",
            "5"
        ])
        .is_err());
    }

    #[test]
    fn test_marker_bounds() {
        let args = parse(&["syntax-worker", "highlight", "a", "--markers"]);
        let Command::Highlight(highlight) = args.command else {
            panic!("expected highlight");
        };
        assert_eq!(highlight.marker_bounds(), Some(MarkerBounds::default()));

        let args = parse(&[
            "syntax-worker",
            "highlight",
            "a",
            "--marker-start",
            "[",
            "--marker-end",
            "]",
        ]);
        let Command::Highlight(highlight) = args.command else {
            panic!("expected highlight");
        };
        assert_eq!(highlight.marker_bounds(), Some(MarkerBounds::new("[", "]")));

        assert!(
            CliArgs::try_parse_from(["syntax-worker", "highlight", "a", "--marker-start", "["])
                .is_err()
        );
    }

    #[test]
    fn test_tokenize_requires_language() {
        assert!(CliArgs::try_parse_from(["syntax-worker", "tokenize", "x.diff"]).is_err());
        let args = parse(&["syntax-worker", "tokenize", "x.diff", "-l", "rust", "--whitespace"]);
        let Command::Tokenize(tokenize) = args.command else {
            panic!("expected tokenize");
        };
        assert_eq!(tokenize.language, "rust");
        assert!(tokenize.whitespace);
    }

    #[test]
    fn test_global_config_flag() {
        let args = parse(&["syntax-worker", "languages", "--config", "c.yaml"]);
        assert_eq!(args.config, Some(PathBuf::from("c.yaml")));
        assert!(matches!(args.command, Command::Languages));
    }
}

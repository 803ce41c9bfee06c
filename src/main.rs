use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use syntax_worker::cli::{CliArgs, Command, HighlightArgs, TokenizeArgs};
use syntax_worker::config::WorkerConfig;
use syntax_worker::diff::parse_unified_diff;
use syntax_worker::syntax::{BUILTIN_GRAMMARS, PLAIN_TEXT};
use syntax_worker::tree::Node;
use syntax_worker::worker::{
    FailurePayload, HighlightOptions, HighlightSlot, SyntaxClient, TokensPayload,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HighlightOutput<'a> {
    language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tree: Option<&'a [Node]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    /// Unhighlighted rendering, present when highlighting failed
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback: Option<&'a [Node]>,
}

#[derive(Serialize)]
struct LanguagesOutput<'a> {
    grammars: Vec<&'a str>,
    aliases: BTreeMap<&'a str, &'a str>,
    dependencies: BTreeMap<&'a str, &'a [String]>,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    syntax_worker::tracing::init();

    let config = match &args.config {
        Some(path) => WorkerConfig::load_from(path).map_err(anyhow::Error::msg)?,
        None => WorkerConfig::load(),
    };

    match args.command {
        Command::Highlight(highlight) => run_highlight(&config, &highlight),
        Command::Tokenize(tokenize) => run_tokenize(&config, &tokenize),
        Command::Languages => run_languages(&config),
    }
}

fn run_highlight(config: &WorkerConfig, args: &HighlightArgs) -> Result<()> {
    let source = read_input(&args.file)?;
    let language = match &args.language {
        Some(language) => language.clone(),
        None => config.language_tables().language_for_path(&args.file),
    };
    tracing::info!("Highlighting {} as {}", args.file.display(), language);

    let options = HighlightOptions {
        node_limit: args.node_limit(config),
        group_by_line: args.group_by_line,
        marked_texts: args.marks.clone(),
    };

    let mut client = SyntaxClient::spawn(config).context("Failed to start syntax worker")?;
    let mut slot = HighlightSlot::new();
    let id = match args.marker_bounds() {
        Some(bounds) => slot.request_marked(&mut client, &source, &bounds, &language, &options),
        None => slot.request(&mut client, &source, &language, &options),
    }?;
    slot.apply(client.wait_for(id)?);
    client.shutdown();

    let state = slot.state();
    print_json(&HighlightOutput {
        language: &language,
        tree: state.tree.as_deref(),
        error: state.error.as_deref(),
        fallback: state.error.as_ref().map(|_| slot.fallback()),
    })?;

    if let Some(error) = &state.error {
        bail!("Highlighting failed: {}", error);
    }
    Ok(())
}

fn run_tokenize(config: &WorkerConfig, args: &TokenizeArgs) -> Result<()> {
    let diff = read_input(&args.diff)?;
    let hunks = parse_unified_diff(&diff)
        .with_context(|| format!("Failed to parse diff {}", args.diff.display()))?;
    tracing::info!("Tokenizing {} hunks as {}", hunks.len(), args.language);

    let mut client = SyntaxClient::spawn(config).context("Failed to start syntax worker")?;
    let result = client.tokenize_hunks(hunks, &args.language, args.whitespace);
    client.shutdown();

    match result {
        Ok(tokens) => print_json(&TokensPayload {
            success: true,
            tokens,
        }),
        Err(reason) => {
            print_json(&FailurePayload {
                reason: reason.clone(),
                success: Some(false),
            })?;
            bail!("Tokenizing failed: {}", reason)
        }
    }
}

fn run_languages(config: &WorkerConfig) -> Result<()> {
    let tables = config.language_tables();
    let mut grammars: Vec<&str> = BUILTIN_GRAMMARS.to_vec();
    grammars.push(PLAIN_TEXT);

    print_json(&LanguagesOutput {
        grammars,
        aliases: tables
            .aliases
            .iter()
            .map(|(alias, id)| (alias.as_str(), id.as_str()))
            .collect(),
        dependencies: tables
            .dependencies
            .iter()
            .map(|(id, deps)| (id.as_str(), deps.as_slice()))
            .collect(),
    })
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read stdin")?;
        return Ok(input);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("Failed to write JSON")?;
    writeln!(stdout)?;
    Ok(())
}

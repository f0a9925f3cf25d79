use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use pq_language_services::ir::node::{NodeId, Position};
use pq_language_services::ir::node_id_map::{NodeIdMap, TreeSnapshot};
use pq_language_services::logging::init_logger;
use pq_language_services::lsp::features::active_node::find_active_node;
use pq_language_services::lsp::features::completion::{
    autocomplete, autocomplete_keywords, autocomplete_language_constant,
};
use pq_language_services::lsp::features::inspect_type::try_inspect_type;
use pq_language_services::settings::InspectionSettings;

/// Inspect a Power Query parse tree snapshot at a cursor position.
#[derive(Parser)]
#[command(name = "pq-inspect", version)]
struct Options {
    /// JSON tree snapshot produced by a parser
    #[arg(long)]
    tree: PathBuf,

    /// Zero-based cursor line
    #[arg(long, default_value_t = 0)]
    line: u32,

    /// Zero-based cursor character
    #[arg(long, default_value_t = 0)]
    character: u32,

    /// Locale for the request (falls back to PQ_LOCALE, then en-US)
    #[arg(long)]
    locale: Option<String>,

    /// Nesting limit for type inspection
    #[arg(long)]
    max_depth: Option<usize>,

    /// Override the log level (otherwise RUST_LOG or "info")
    #[arg(long)]
    log_level: Option<String>,

    /// Disable ANSI colors in log output
    #[arg(long)]
    no_color: bool,

    /// Also write a debug-level session log to the cache directory
    #[arg(long)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the ancestry under the cursor
    ActiveNode,
    /// Print the keywords valid at the cursor
    Keywords,
    /// Print the `nullable`/`optional` suggestion at the cursor, if any
    LanguageConstant,
    /// Print every suggestion at the cursor as LSP completion items
    Complete,
    /// Print the inferred type of a node
    Type {
        #[arg(long)]
        node: u32,
    },
}

fn load_tree(path: &PathBuf) -> anyhow::Result<NodeIdMap> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    let snapshot = TreeSnapshot::from_json(&text)
        .with_context(|| format!("`{}` is not a tree snapshot", path.display()))?;
    NodeIdMap::try_from(snapshot).with_context(|| format!("`{}` is not a well-formed tree", path.display()))
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let options = Options::parse();
    let _guard = init_logger(options.no_color, options.log_level.as_deref(), options.log_file)
        .context("failed to initialize logging")?;

    let mut settings = InspectionSettings::from_env_or_default(options.locale.as_deref());
    if let Some(max_depth) = options.max_depth {
        settings = settings.with_max_depth(max_depth);
    }
    let map = load_tree(&options.tree)?;
    let position = Position::new(options.line, options.character);
    info!(
        "Loaded {} nodes, inspecting at ({}, {}) with locale {}",
        map.len(),
        position.line,
        position.character,
        settings.locale
    );

    match options.command {
        Command::ActiveNode => print_json(&find_active_node(&map, position)),
        Command::Keywords => {
            let keywords = find_active_node(&map, position)
                .map(|active_node| autocomplete_keywords(&active_node))
                .unwrap_or_default();
            let labels: Vec<&str> = keywords.iter().map(|keyword| keyword.as_str()).collect();
            print_json(&labels)
        }
        Command::LanguageConstant => {
            let item = find_active_node(&map, position)
                .and_then(|active_node| autocomplete_language_constant(&active_node));
            print_json(&item)
        }
        Command::Complete => {
            let items = autocomplete(&settings, &map, position)
                .context("autocomplete failed")?
                .map(|suggestions| suggestions.completion_items())
                .unwrap_or_default();
            print_json(&items)
        }
        Command::Type { node } => {
            let inspected = try_inspect_type(&settings, &map, NodeId(node))
                .with_context(|| format!("failed to inspect node {node}"))?;
            println!("{inspected}");
            Ok(())
        }
    }
}

//! randomgen - random test data from short queries
//!
//! # Modes
//! - `randomgen rd password 16`: one query, results as colored text
//! - `randomgen --json rd lorem 5`: same, as JSON on stdout
//! - `randomgen --interactive`: one query per stdin line; `:copy N`,
//!   `:regen N` and `:select N` act on the previous result list
//! - `randomgen --batch`: one query per stdin line, dispatched in parallel,
//!   printed in input order
//!
//! Logs go to stderr and are controlled by `RUST_LOG`.

use clap::Parser;
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;
use std::io::{self, BufRead, Read};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use randomgen::{
    Config, ConfigError, GeneratedResult, Locale, MenuAction, RandomGen, ResultKind, TerminalHost,
};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read stdin: {0}")]
    StdinRead(#[from] io::Error),

    #[error("Failed to serialize output: {0}")]
    OutputSerialize(#[from] serde_json::Error),
}

// ============================================================================
// Command Line
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "randomgen")]
#[command(about = "Generate random test data from short queries")]
#[command(version)]
struct Cli {
    /// Query words, e.g. `rd password 16` (empty shows the help listing)
    query: Vec<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Read queries from stdin, one per line, keeping the cache between them
    #[arg(short, long, conflicts_with = "batch")]
    interactive: bool,

    /// Read queries from stdin and run them in parallel
    #[arg(short, long)]
    batch: bool,

    /// Action keyword (first token only)
    #[arg(short, long)]
    keyword: Option<String>,

    /// Locale for fake data: en, fr_fr, de_de, pt_br
    #[arg(short, long)]
    locale: Option<Locale>,

    /// Config file (default: <config dir>/randomgen/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// One line of batch output
#[derive(Debug, Serialize)]
struct BatchItem<'a> {
    query: &'a str,
    results: Vec<GeneratedResult>,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    // Initialize tracing if RUST_LOG is set
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("Error: {}", e);
        std::process::exit(0);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = resolve_config(&cli);
    debug!("Using config: {:?}", config);

    let engine = RandomGen::new(&config);

    if cli.interactive {
        engine.start();
        run_interactive(&engine, cli.json)?;
    } else if cli.batch {
        run_batch(&engine, cli.json)?;
    } else {
        let query = cli.query.join(" ");
        let results = engine.query(&query);
        print_results(&results, cli.json)?;
    }

    engine.shutdown();
    Ok(())
}

/// File config (if any) with command-line overrides applied
fn resolve_config(cli: &Cli) -> Config {
    let mut config = match cli.config.clone().or_else(Config::default_path) {
        Some(path) => match Config::load(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(ConfigError::NotFound(path)) => {
                debug!("No config at {}, using defaults", path.display());
                Config::default()
            }
            Err(e) => {
                warn!("{}, using defaults", e);
                Config::default()
            }
        },
        None => Config::default(),
    };

    if let Some(keyword) = &cli.keyword {
        config.action_keyword = keyword.clone();
    }
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }
    config
}

// ============================================================================
// Modes
// ============================================================================

fn run_interactive(engine: &RandomGen, json: bool) -> Result<(), CliError> {
    let host = TerminalHost::new();
    let mut last: Vec<GeneratedResult> = Vec::new();

    for line in io::stdin().lock().lines() {
        let line = line?;
        let trimmed = line.trim();

        if matches!(trimmed, ":q" | ":quit") {
            break;
        }

        if let Some((verb, index)) = parse_action(trimmed) {
            let Some(result) = index.checked_sub(1).and_then(|i| last.get(i)) else {
                eprintln!("{}", format!("No result #{index}").yellow());
                continue;
            };
            let Some(action) = menu_action(engine, result, verb) else {
                eprintln!("{}", format!(":{verb} is not available for #{index}").yellow());
                continue;
            };
            if !engine.run_menu_action(&action, &host) {
                eprintln!("{}", format!(":{verb} failed").red());
                continue;
            }
            // Regenerate and select leave a query for us to run next
            if let Some(query) = host.take_pending_query() {
                println!("{}", format!("> {query}").dimmed());
                last = engine.query(&query);
                print_results(&last, json)?;
            }
            continue;
        }

        last = engine.query(&line);
        print_results(&last, json)?;
    }

    Ok(())
}

fn run_batch(engine: &RandomGen, json: bool) -> Result<(), CliError> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let queries: Vec<&str> = input.lines().filter(|l| !l.trim().is_empty()).collect();
    info!("Running {} queries", queries.len());

    let items: Vec<BatchItem> = queries
        .par_iter()
        .map(|&query| BatchItem {
            query,
            results: engine.query(query),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for item in &items {
        println!("{}", format!("> {}", item.query).dimmed());
        print_results(&item.results, false)?;
    }
    Ok(())
}

/// `:copy 2` -> ("copy", 2)
fn parse_action(line: &str) -> Option<(&str, usize)> {
    let rest = line.strip_prefix(':')?;
    let (verb, index) = rest.split_once(char::is_whitespace)?;
    let index = index.trim().parse().ok()?;
    matches!(verb, "copy" | "regen" | "select").then_some((verb, index))
}

fn menu_action(engine: &RandomGen, result: &GeneratedResult, verb: &str) -> Option<MenuAction> {
    engine
        .context_menu(result)
        .into_iter()
        .map(|entry| entry.action)
        .find(|action| {
            matches!(
                (verb, action),
                ("copy", MenuAction::Copy { .. })
                    | ("regen", MenuAction::Regenerate { .. })
                    | ("select", MenuAction::Select { .. })
            )
        })
}

// ============================================================================
// Output
// ============================================================================

fn print_results(results: &[GeneratedResult], json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        let title = match &result.kind {
            ResultKind::Generated(_) => result.title.green().bold(),
            ResultKind::Suggestion(_) => result.title.cyan(),
            ResultKind::Error => result.title.red().bold(),
        };
        println!("{:>3}. {}", i + 1, title);
        println!("     {}", result.subtitle.dimmed());
    }
    Ok(())
}

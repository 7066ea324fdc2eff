//! uql — translate a JSON query for any supported backend.
//!
//! # Usage
//!
//! ```bash
//! # PostgreSQL (default target)
//! uql query.json
//!
//! # From stdin, as a MongoDB find command
//! cat query.json | uql - -t mongo
//!
//! # MySQL with placeholders
//! uql query.json -t mysql --params
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::EnvFilter;
use uql::config::Config;
use uql::prelude::*;

#[derive(Parser)]
#[command(name = "uql")]
#[command(version)]
#[command(about = "Unified Query Language: one JSON query, many backends", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = "EXAMPLES:
    uql query.json
    uql query.json -t elastic --compact
    echo '{\"from\":\"users\",\"where\":{\"age\":{\"gt\":30}}}' | uql - -t cassandra --allow-filtering")]
struct Cli {
    /// JSON query file, or `-` for stdin
    query: Option<PathBuf>,

    /// Output target (see `uql targets`)
    #[arg(short, long, env = "UQL_TARGET")]
    target: Option<Target>,

    /// Emit placeholders and list the bound values (SQL targets)
    #[arg(long)]
    params: bool,

    /// Append ALLOW FILTERING (Cassandra)
    #[arg(long)]
    allow_filtering: bool,

    /// Only check the query, print nothing on success
    #[arg(long)]
    validate_only: bool,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,

    /// Verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,

    /// Config file (default: ./uql.toml, then the user config dir)
    #[arg(long, env = "UQL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List output targets
    Targets,
    /// List filter operators and the value each expects
    Operators,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Some(Commands::Targets) => {
            show_targets();
            Ok(())
        }
        Some(Commands::Operators) => {
            show_operators();
            Ok(())
        }
        None => run(&cli),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "uql=debug" } else { "uql=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    let target = match cli.target {
        Some(t) => t,
        None => config.target()?,
    };
    let mut options = config.translate_options();
    options.parameterized |= cli.params;
    options.allow_filtering |= cli.allow_filtering;
    let pretty = config.pretty && !cli.compact;

    let input = read_input(cli.query.as_ref())?;
    let query = uql::parse_query(&input).context("reading query")?;

    if cli.validate_only {
        query.validate()?;
        if cli.verbose {
            eprintln!("{} query is valid", "✓".green());
        }
        return Ok(());
    }

    if cli.verbose {
        eprintln!("{} {}", "Target:".dimmed(), target.to_string().cyan());
    }

    let output = translate(&query, target, &options)
        .with_context(|| format!("translating for {target}"))?;
    println!("{}", output.render(pretty)?);
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => {
            fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading query from stdin")?;
            Ok(buf)
        }
    }
}

fn show_targets() {
    println!("{}", "UQL Targets".cyan().bold());
    println!();
    for target in Target::ALL {
        println!(
            "  {:16} {}",
            target.key().yellow(),
            target.description().white()
        );
    }
}

fn show_operators() {
    println!("{}", "UQL Operators".cyan().bold());
    println!();
    println!("  {:18} {}", "Operator".white().bold(), "Value".white().bold());
    println!("  {}", "─".repeat(48).dimmed());
    for op in Operator::ALL {
        let hint = match op.value_shape() {
            ValueShape::Any => "any value",
            ValueShape::Nothing => "(ignored)",
            ValueShape::List => "list",
            ValueShape::Pair => "[low, high]",
            ValueShape::Text => "string",
            ValueShape::Object => "GeoJSON object",
        };
        println!("  {:18} {}", op.as_str().yellow(), hint.dimmed());
    }
}

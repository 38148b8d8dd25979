//! Binary entry point for the `pql` query rendering CLI.
#![forbid(unsafe_code)]

#[path = "pql/config.rs"]
mod config;
#[path = "pql/ui.rs"]
mod ui;

use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use pilosa_pql::query::{parse_documents, QueryBatch, QueryKind};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::CliConfig;
use ui::Ui;

#[derive(Parser, Debug)]
#[command(
    name = "pql",
    version,
    about = "Render JSON query documents into Pilosa PQL",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "PQL_CONFIG",
        value_name = "FILE",
        help = "Path to cli.toml (defaults to the user config directory)"
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_enum,
        help = "Output format for structured responses [default: text]"
    )]
    format: Option<OutputFormat>,

    #[arg(long, global = true, value_enum, help = "Color output [default: auto]")]
    color: Option<ColorMode>,

    #[arg(
        short,
        long,
        global = true,
        help = "Log library activity to stderr (same as RUST_LOG=pilosa_pql=debug)"
    )]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct InputArgs {
    #[arg(
        value_name = "FILE",
        help = "Query document to read; '-' or omitted reads stdin"
    )]
    input: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Print the PQL for a query document")]
    Render(InputArgs),

    #[command(about = "Validate a query document and classify each query")]
    Check(InputArgs),

    #[command(about = "List the supported query kinds")]
    Kinds,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Serialize)]
struct RenderReport {
    pql: String,
    write: bool,
    queries: Vec<QueryReport>,
}

#[derive(Serialize)]
struct QueryReport {
    kind: &'static str,
    write: bool,
    pql: String,
}

#[derive(Serialize)]
struct KindReport {
    name: &'static str,
    write: bool,
    input_limit: Option<usize>,
    composite: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.clone())?;
    init_tracing(cli.verbose, config.log_filter());
    debug!(config = ?config.path(), "loaded CLI config");

    let format = cli
        .format
        .or(config.format())
        .unwrap_or(OutputFormat::Text);
    let ui = Ui::new(cli.color.or(config.color()).unwrap_or(ColorMode::Auto));

    match cli.command {
        Command::Render(args) => {
            let batch = load_batch(args.input.as_deref())?;
            let report = build_report(&batch);
            emit(format, &report, || println!("{}", report.pql))?;
        }
        Command::Check(args) => {
            let batch = load_batch(args.input.as_deref())?;
            let report = build_report(&batch);
            emit(format, &report, || print_check_text(&ui, &report))?;
        }
        Command::Kinds => {
            let kinds: Vec<KindReport> = QueryKind::ALL
                .iter()
                .map(|kind| KindReport {
                    name: kind.name(),
                    write: kind.is_write(),
                    input_limit: kind.input_limit(),
                    composite: kind.is_composite(),
                })
                .collect();
            emit(format, &kinds, || print_kinds_text(&ui, &kinds))?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, config_filter: Option<&str>) {
    let fallback = if verbose {
        "pilosa_pql=debug"
    } else {
        config_filter.unwrap_or("warn")
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}

fn load_batch(input: Option<&Path>) -> Result<QueryBatch, Box<dyn Error>> {
    let text = read_input(input)?;
    Ok(parse_documents(&text)?)
}

fn read_input(input: Option<&Path>) -> Result<String, Box<dyn Error>> {
    match input {
        Some(path) if path != Path::new("-") => fs::read_to_string(path).map_err(|err| {
            Box::<dyn Error>::from(format!("failed to read {}: {err}", path.display()))
        }),
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn build_report(batch: &QueryBatch) -> RenderReport {
    RenderReport {
        pql: batch.to_pql(),
        write: batch.is_write(),
        queries: batch
            .iter()
            .map(|query| QueryReport {
                kind: query.kind().name(),
                write: query.is_write(),
                pql: query.to_pql(),
            })
            .collect(),
    }
}

fn emit<T, F>(format: OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: Serialize,
    F: Fn(),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(),
    }
    Ok(())
}

fn print_check_text(ui: &Ui, report: &RenderReport) {
    for (idx, query) in report.queries.iter().enumerate() {
        println!("{idx}: {} ({})", query.kind, ui.access(query.write));
    }
    println!(
        "{}",
        ui.muted(&format!(
            "{} queries ok, request is {}",
            report.queries.len(),
            if report.write { "write" } else { "read" }
        ))
    );
}

fn print_kinds_text(ui: &Ui, kinds: &[KindReport]) {
    for kind in kinds {
        let limit = match (kind.composite, kind.input_limit) {
            (true, Some(limit)) => format!("inputs<={limit}"),
            (true, None) => "inputs unlimited".to_string(),
            (false, _) => "no inputs".to_string(),
        };
        println!("{:<16} {:<5} {}", kind.name, ui.access(kind.write), ui.muted(&limit));
    }
}

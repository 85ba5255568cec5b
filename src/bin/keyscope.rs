//! Binary entry point for the keyscope index selection explainer.
#![forbid(unsafe_code)]

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use keyscope::query::{
    CostModel, IndexSelector, PlanRequest, PlannerOptions, Scan, SelectionExplain, TracingObserver,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "keyscope",
    version,
    about = "Explains index selection for a table scan",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "TOML file overriding cost model factors"
    )]
    cost: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Log planner events (filter with RUST_LOG, default debug)"
    )]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank candidate indexes for a JSON planning request
    Explain {
        /// Path to the request file
        request: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    if cli.trace {
        init_tracing();
    }

    match cli.command {
        Command::Explain { request } => {
            let text = fs::read_to_string(&request)
                .map_err(|err| format!("failed to read {}: {err}", request.display()))?;
            let request = PlanRequest::from_json(&text)?;
            let cost = match (&cli.cost, request.cost) {
                (Some(path), _) => read_cost_model(path)?,
                (None, Some(cost)) => cost,
                (None, None) => CostModel::default(),
            };
            let mut options = PlannerOptions::default().with_cost_model(cost);
            if cli.trace {
                options = options.with_observer(Arc::new(TracingObserver));
            }
            let selector = IndexSelector::new(options)?;
            let (scan, explain) = selector.select_explained(request.to_scan()?);
            let report = ExplainOutput::new(&scan, explain);
            emit(&cli.format, &report, |_| print_explain_text(&report))?;
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

fn read_cost_model(path: &Path) -> Result<CostModel, Box<dyn Error>> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read cost model {}: {err}", path.display()))?;
    let model: CostModel = toml::from_str(&contents)
        .map_err(|err| format!("failed to parse cost model {}: {err}", path.display()))?;
    Ok(model)
}

#[derive(serde::Serialize)]
struct ExplainOutput {
    index: Option<String>,
    secondary: bool,
    start_key: String,
    end_key: String,
    selection: Option<SelectionExplain>,
}

impl ExplainOutput {
    fn new(scan: &Scan, selection: Option<SelectionExplain>) -> Self {
        Self {
            index: scan.index().map(|index| index.name.clone()),
            secondary: scan.is_secondary_index(),
            start_key: hex::encode(&scan.span().start),
            end_key: hex::encode(&scan.span().end),
            selection,
        }
    }
}

fn emit<T, F>(format: &OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: serde::Serialize,
    F: Fn(OutputFormat),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(OutputFormat::Text),
    }
    Ok(())
}

fn print_explain_text(report: &ExplainOutput) {
    match &report.selection {
        Some(selection) => println!("{selection}"),
        None => {
            println!("no filter; scanning the full index");
            println!(
                "index: {}",
                report.index.as_deref().unwrap_or("<none>")
            );
            println!("span:  [{}, {})", report.start_key, report.end_key);
        }
    }
    println!("secondary: {}", report.secondary);
}

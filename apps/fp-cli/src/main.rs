mod case;
mod error;
mod report;

use clap::{Parser, Subcommand, ValueEnum};
use error::CliResult;
use fp_models::StandardAtmosphere;
use report::Report;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fp-cli")]
#[command(about = "FlightPath CLI - per-node control solve for prescribed trajectories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a case file and its model stack
    Validate {
        /// Path to the case YAML file
        case_path: PathBuf,
    },
    /// Solve a case and print the per-node controls
    Solve {
        /// Path to the case YAML file
        case_path: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        format: Format,
        /// Output file (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
}

fn main() -> CliResult<()> {
    // Logs go to stderr so JSON output stays clean; RUST_LOG overrides the level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Solve {
            case_path,
            format,
            output,
        } => cmd_solve(&case_path, format, output.as_deref()),
    }
}

fn cmd_validate(case_path: &Path) -> CliResult<()> {
    println!("Validating case: {}", case_path.display());
    let case = case::load_case(case_path)?;
    case.problem().validate()?;
    case.model_stack().validate(&case.model_context())?;
    println!(
        "✓ Case '{}' is valid ({} nodes, {} models)",
        case.name,
        case.nodes.len(),
        case.model_stack().len()
    );
    Ok(())
}

fn cmd_solve(case_path: &Path, format: Format, output: Option<&Path>) -> CliResult<()> {
    let case = case::load_case(case_path)?;
    let problem = case.problem();
    let stack = case.model_stack();

    let started = Instant::now();
    let solution = fp_solver::solve(&problem, &stack, &StandardAtmosphere::new(), None)?;
    tracing::info!(
        case = case.name.as_str(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "solve finished"
    );

    let report = Report::new(&case.name, &solution);
    let mut buffer = Vec::new();
    match format {
        Format::Table => report.write_table(&mut buffer)?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut buffer, &report)?;
            buffer.push(b'\n');
        }
    }

    match output {
        Some(path) => std::fs::write(path, buffer)?,
        None => io::stdout().write_all(&buffer)?,
    }
    Ok(())
}

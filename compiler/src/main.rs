use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use flowc::config::EngineConfig;
use flowc::error::CompilerError;
use flowc::interpret::{CancelToken, InstantClock, Interpreter, LogEntry, LogStatus, TokioClock};
use flowc::lower::NameCollision;
use flowc::parse::{self, Workflow};
use flowc::validate;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "flowc",
    about = "Lower generated workflows to n8n and simulate their runs",
    version
)]
struct Cli {
    /// Engine config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Debug logging (overridden by FLOWC_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lower a workflow file to an n8n import document
    Lower {
        /// Workflow JSON file
        file: PathBuf,
        /// Output path (default: `{name}-n8n.json`)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write to stdout instead of a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
        /// Keep only the last connection for duplicated node names
        #[arg(long)]
        allow_duplicate_names: bool,
    },
    /// Simulate a run and print the log as it is produced
    Run {
        /// Workflow JSON file
        file: PathBuf,
        /// Skip the simulated delays
        #[arg(long)]
        fast: bool,
    },
    /// Recover workflow JSON from raw generation output
    Extract {
        /// File containing the generation text
        file: PathBuf,
        /// Prompt used to build the fallback workflow when nothing is recoverable
        #[arg(short, long)]
        prompt: Option<String>,
    },
    /// Print validation and lint diagnostics
    Check {
        /// Workflow JSON file
        file: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    flowc::logger::init(cli.verbose);

    let config = EngineConfig::load_or_default(cli.config.as_deref())
        .context("failed to load engine config")?;

    match cli.command {
        Commands::Lower {
            file,
            output,
            stdout,
            allow_duplicate_names,
        } => lower_cmd(&config, &file, output, stdout, allow_duplicate_names),
        Commands::Run { file, fast } => run_cmd(&config, &file, fast).await,
        Commands::Extract { file, prompt } => extract_cmd(&file, prompt),
        Commands::Check { file } => check_cmd(&config, &file),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn lower_cmd(
    config: &EngineConfig,
    file: &Path,
    output: Option<PathBuf>,
    stdout: bool,
    allow_duplicate_names: bool,
) -> Result<()> {
    let workflow = read_workflow(file)?;
    let mut options = config.lower.clone();
    if allow_duplicate_names {
        options.on_name_collision = NameCollision::Overwrite;
    }

    let diagnostics = validate::validate_workflow(&workflow, &config.limits, &options);
    print_diagnostics(&diagnostics);
    if validate::has_fatal(&diagnostics) {
        bail!("{} has validation errors", file.display());
    }

    let graph = flowc::lower::lower(&workflow, &options).map_err(compile_errors)?;
    let json = graph.to_pretty_json()?;

    if stdout {
        println!("{}", json);
        return Ok(());
    }

    let path = output.unwrap_or_else(|| export_file_name(&workflow));
    std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!("✓ Exported {} nodes to {}", graph.nodes.len(), path.display());
    Ok(())
}

async fn run_cmd(config: &EngineConfig, file: &Path, fast: bool) -> Result<()> {
    let workflow = read_workflow(file)?;
    for warning in validate::lint(&workflow) {
        eprintln!("warning: {}", warning);
    }

    let (mut tx, mut rx) = mpsc::unbounded_channel::<LogEntry>();
    let printer = tokio::spawn(async move {
        while let Some(entry) = rx.recv().await {
            print_entry(&entry);
        }
    });

    let cancel = CancelToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let outcome = if fast {
        Interpreter::with_clock(InstantClock, config.interpreter)
            .run(&workflow, &mut tx, &cancel)
            .await
    } else {
        Interpreter::with_clock(TokioClock, config.interpreter)
            .run(&workflow, &mut tx, &cancel)
            .await
    };

    drop(tx);
    ctrl_c.abort();
    printer.await?;

    if !outcome.is_completed() {
        eprintln!("run cancelled after {} lines", outcome.emitted());
    }
    Ok(())
}

fn extract_cmd(file: &Path, prompt: Option<String>) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let workflow = match prompt {
        Some(prompt) => parse::parse_generated(&text, &prompt),
        None => parse::extract_workflow(&text).map_err(compile_errors)?,
    };

    println!("{}", serde_json::to_string_pretty(&workflow)?);
    Ok(())
}

fn check_cmd(config: &EngineConfig, file: &Path) -> Result<()> {
    let workflow = read_workflow(file)?;
    let diagnostics = validate::validate_workflow(&workflow, &config.limits, &config.lower);

    if diagnostics.is_empty() {
        println!(
            "✓ {}: {} steps, depth {}",
            file.display(),
            workflow.step_count(),
            workflow.depth()
        );
        return Ok(());
    }

    print_diagnostics(&diagnostics);
    if validate::has_fatal(&diagnostics) {
        bail!("{} has validation errors", file.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_workflow(file: &Path) -> Result<Workflow> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    parse::parse(&json).map_err(compile_errors)
}

fn export_file_name(workflow: &Workflow) -> PathBuf {
    let name = if workflow.name.is_empty() {
        "workflow"
    } else {
        workflow.name.as_str()
    };
    PathBuf::from(format!("{}-n8n.json", name))
}

fn compile_errors(errors: Vec<CompilerError>) -> anyhow::Error {
    let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
    anyhow::anyhow!(lines.join("\n"))
}

fn print_diagnostics(diagnostics: &[CompilerError]) {
    for d in diagnostics {
        let label = if d.is_warning() { "warning" } else { "error" };
        eprintln!("{}: {}", label, d);
    }
}

fn print_entry(entry: &LogEntry) {
    let marker = match entry.status {
        LogStatus::Info => " ",
        LogStatus::Success => "+",
        LogStatus::Error => "!",
    };
    let mut out = std::io::stdout().lock();
    let _ = writeln!(out, "[{}] {} {}", entry.time, marker, entry.message);
}

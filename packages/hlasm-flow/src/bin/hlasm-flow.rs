//! HLASM flow CLI
//!
//! # Usage
//!
//! ```bash
//! # Flow graph of the prologue of DRIVER.asm, searching lib/ for callees
//! hlasm-flow flow DRIVER.asm --deps lib --out out --format dot --tree
//!
//! # Flow graph of lines 120..=180 only
//! hlasm-flow flow DRIVER.asm --deps lib --start-line 120 --end-line 180
//!
//! # Block chunk analysis, following dependencies into lib/
//! hlasm-flow analyze DRIVER.asm --external lib --recursive --format json
//! ```
//!
//! Exit codes: 0 on success (missing targets are warnings), 1 on setup
//! errors, 2 on argument errors.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::warn;

use hlasm_flow::features::cross_file::MissingDependency;
use hlasm_flow::pipeline::{AnalysisReport, FileAnalysis};
use hlasm_flow::{build_tree, FlowConfig, FlowPipeline, FlowResult, HlasmAnalysis, OutputFormat};

#[derive(Parser)]
#[command(name = "hlasm-flow")]
#[command(about = "Static call flow reconstruction for HLASM sources", long_about = None)]
struct Cli {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum GraphFormat {
    Dot,
    Json,
    Mermaid,
}

impl From<GraphFormat> for OutputFormat {
    fn from(format: GraphFormat) -> Self {
        match format {
            GraphFormat::Dot => OutputFormat::Dot,
            GraphFormat::Json => OutputFormat::Json,
            GraphFormat::Mermaid => OutputFormat::Mermaid,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the call flow reachable from an entry block
    Flow {
        /// Entry source file
        source: PathBuf,

        /// Directory searched recursively for callees, macros and copybooks
        #[arg(short, long)]
        deps: Option<PathBuf>,

        /// First line of the entry block (1-indexed)
        #[arg(long, requires = "end_line")]
        start_line: Option<usize>,

        /// Last line of the entry block (inclusive)
        #[arg(long, requires = "start_line")]
        end_line: Option<usize>,

        /// Output directory (chunks/ and cfg/); stdout when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Graph format
        #[arg(short, long, value_enum, default_value = "dot")]
        format: GraphFormat,

        /// Also write the nested tree view
        #[arg(long)]
        tree: bool,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Split a source into block chunks and list their dependencies
    Analyze {
        /// Source file
        source: PathBuf,

        /// Directory searched for dependency files
        #[arg(short, long)]
        external: Option<PathBuf>,

        /// Follow dependencies file by file
        #[arg(short, long)]
        recursive: bool,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Write one file per chunk into this directory
        #[arg(long)]
        split: Option<PathBuf>,

        /// Write unresolved dependencies to this file
        #[arg(long)]
        missing_log: Option<PathBuf>,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let outcome = match cli.command {
        Commands::Flow {
            source,
            deps,
            start_line,
            end_line,
            out,
            format,
            tree,
            config,
        } => run_flow(FlowArgs {
            source,
            deps,
            range: start_line.zip(end_line),
            out,
            format: format.into(),
            tree,
            config,
        }),
        Commands::Analyze {
            source,
            external,
            recursive,
            format,
            split,
            missing_log,
            config,
        } => run_analyze(AnalyzeArgs {
            source,
            external,
            recursive,
            format,
            split,
            missing_log,
            config,
        }),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<FlowConfig> {
    match path {
        Some(path) => FlowConfig::from_yaml(path)
            .with_context(|| format!("loading configuration {}", path.display())),
        None => Ok(FlowConfig::default()),
    }
}

/// Chunk names become file names
fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '@' | '#' | '$' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// flow
// ═══════════════════════════════════════════════════════════════════════════

struct FlowArgs {
    source: PathBuf,
    deps: Option<PathBuf>,
    range: Option<(usize, usize)>,
    out: Option<PathBuf>,
    format: OutputFormat,
    tree: bool,
    config: Option<PathBuf>,
}

fn run_flow(args: FlowArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut pipeline = FlowPipeline::new(config)?;
    if let Some(dir) = &args.deps {
        pipeline = pipeline.with_dependency_dir(dir);
    }
    if let Some((start, end)) = args.range {
        pipeline = pipeline.with_range(start, end);
    }

    let result = pipeline.run_file(&args.source)?;

    match &args.out {
        Some(out) => write_flow_outputs(out, &result, args.format, args.tree)?,
        None => {
            println!("{}", args.format.render(&result));
            if args.tree {
                println!("{}", serde_json::to_string_pretty(&build_tree(&result))?);
            }
        }
    }

    if !result.missing.is_empty() {
        eprintln!(
            "warning: {} unresolved target(s): {}",
            result.missing.len(),
            result.missing.join(", ")
        );
    }
    Ok(())
}

fn write_flow_outputs(out: &Path, result: &FlowResult, format: OutputFormat, tree: bool) -> Result<()> {
    let chunks_dir = out.join("chunks");
    let cfg_dir = out.join("cfg");
    fs::create_dir_all(&chunks_dir).with_context(|| format!("creating {}", chunks_dir.display()))?;
    fs::create_dir_all(&cfg_dir).with_context(|| format!("creating {}", cfg_dir.display()))?;

    for chunk in result.chunks.iter() {
        let path = chunks_dir.join(format!("{}.txt", file_safe(&chunk.name)));
        let mut body = chunk.lines.join("\n");
        body.push('\n');
        fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
    }

    let flow_json = serde_json::to_string_pretty(&hlasm_flow::features::flow_graph::to_json(result))?;
    fs::write(cfg_dir.join("flow.json"), flow_json)?;
    fs::write(
        cfg_dir.join(format!("cfg.{}", format.extension())),
        format.render(result),
    )?;
    if tree {
        fs::write(
            cfg_dir.join("tree.json"),
            serde_json::to_string_pretty(&build_tree(result))?,
        )?;
    }

    println!(
        "{} chunks written to {}, graph in {}",
        result.chunks.len(),
        chunks_dir.display(),
        cfg_dir.display()
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// analyze
// ═══════════════════════════════════════════════════════════════════════════

struct AnalyzeArgs {
    source: PathBuf,
    external: Option<PathBuf>,
    recursive: bool,
    format: ReportFormat,
    split: Option<PathBuf>,
    missing_log: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut analysis = HlasmAnalysis::new(config)?;
    if let Some(dir) = &args.external {
        analysis = analysis.with_external_dir(dir);
    }

    let report = if args.recursive {
        analysis.analyze_with_dependencies(&args.source)?
    } else {
        let file = analysis.analyze_file(&args.source)?;
        let mut report = AnalysisReport::default();
        HlasmAnalysis::record_dependencies(&file, &mut report.dependency_map);
        report.files.push(file);
        report
    };

    if let Some(dir) = &args.split {
        split_chunks(dir, &report.files)?;
    }
    if let Some(path) = &args.missing_log {
        write_missing_log(path, &report.missing)?;
    }

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report_json(&report))?),
        ReportFormat::Text => print_report(&report),
    }

    if !report.missing.is_empty() {
        warn!(count = report.missing.len(), "Unresolved dependencies");
        eprintln!("warning: {} unresolved dependenc(ies)", report.missing.len());
    }
    Ok(())
}

fn split_chunks(dir: &Path, files: &[FileAnalysis]) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    for file in files {
        for chunk in &file.chunks {
            let name = format!("{}_{}.txt", file_safe(&file.program), file_safe(&chunk.label));
            let body: Vec<&str> = chunk.instructions.iter().map(|i| i.raw_text.as_str()).collect();
            fs::write(dir.join(name), body.join("\n") + "\n")?;
        }
    }
    Ok(())
}

fn write_missing_log(path: &Path, missing: &[MissingDependency]) -> Result<()> {
    let body: String = missing.iter().map(|m| format!("{}\n", m)).collect();
    fs::write(path, body).with_context(|| format!("writing {}", path.display()))
}

fn report_json(report: &AnalysisReport) -> serde_json::Value {
    let files: Vec<_> = report
        .files
        .iter()
        .map(|file| {
            let chunks: Vec<_> = file
                .chunks
                .iter()
                .map(|c| {
                    json!({
                        "label": c.label,
                        "section_kind": c.section_kind,
                        "start_line": c.start_line,
                        "instructions": c.instruction_count(),
                        "dependencies": c.dependencies,
                    })
                })
                .collect();
            json!({
                "source_file": file.source_file.display().to_string(),
                "program": file.program,
                "chunks": chunks,
            })
        })
        .collect();

    json!({
        "files": files,
        "dependency_map": report.dependency_map.to_json(),
        "cycles": report.dependency_map.cycles(),
        "missing": report.missing,
    })
}

fn print_report(report: &AnalysisReport) {
    for file in &report.files {
        println!("{} ({})", file.program, file.source_file.display());
        for chunk in &file.chunks {
            println!(
                "  {:<10} {:<10} line {:>5}  {:>4} instr",
                chunk.label,
                chunk.section_kind.as_str(),
                chunk.start_line,
                chunk.instruction_count()
            );
            if !chunk.dependencies.is_empty() {
                println!("    -> {}", chunk.dependencies.join(", "));
            }
            let callers = report.dependency_map.dependents(file.vertex_name(chunk));
            if !callers.is_empty() {
                println!("    <- {}", callers.join(", "));
            }
        }
    }
    for cycle in report.dependency_map.cycles() {
        println!("cycle: {}", cycle.join(" -> "));
    }
    for missing in &report.missing {
        println!("missing: {}", missing);
    }
}

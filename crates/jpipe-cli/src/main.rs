//! `jpipe`: drive a source unit through the assembler/interpreter
//! toolchain pipeline.
//!
//! Usage:
//!   jpipe <source> [mode]
//!   jpipe <source> debug --root <dir> --check exit
//!   jpipe <source> --config pipeline.json

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use jpipe_core::{BuildCheck, Pipeline, PipelineConfig, PipelineError, RunMode};

#[derive(Parser)]
#[command(
    name = "jpipe",
    version,
    about = "Assembler/interpreter toolchain pipeline runner"
)]
struct Cli {
    /// Source unit to assemble and execute (a file in the source directory)
    source: String,

    /// Interpreter run mode
    #[arg(value_enum, default_value = "normal")]
    mode: ModeArg,

    /// Working root containing the source directory and toolchain projects
    #[arg(long)]
    root: Option<PathBuf>,

    /// Build verification variant
    #[arg(long, value_enum)]
    check: Option<CheckArg>,

    /// JSON pipeline configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Normal,
    Debug,
}

impl From<ModeArg> for RunMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Normal => RunMode::Normal,
            ModeArg::Debug => RunMode::Debug,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CheckArg {
    /// Trust the build process exit code
    Exit,
    /// Require the build log success sentinel
    Log,
}

impl From<CheckArg> for BuildCheck {
    fn from(check: CheckArg) -> Self {
        match check {
            CheckArg::Exit => BuildCheck::ExitStatus,
            CheckArg::Log => BuildCheck::BuildLog,
        }
    }
}

/// Applies CLI overrides on top of the default or file-loaded config.
fn resolve_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if let Some(check) = cli.check {
        config.build_check = check.into();
    }
    Ok(config)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("jpipe: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let mut pipeline = Pipeline::from_config(&config);
    match pipeline.run(&cli.source, cli.mode.into()) {
        Ok(result) => {
            if !result.output.is_empty() {
                println!("interpreter output:\n{}", result.output);
            }
            println!("--done--");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}

/// Prints the stage-labeled failure plus whatever diagnostics the failed
/// stage captured.
fn report_failure(err: &PipelineError) {
    match err {
        PipelineError::AssembleFailed { stdout, stderr } => {
            if !stderr.is_empty() {
                eprintln!("stderr:\n{stderr}");
            }
            if !stdout.is_empty() {
                eprintln!("stdout:\n{stdout}");
            }
        }
        PipelineError::BuildFailed {
            diagnostic: Some(log),
            ..
        } => {
            eprintln!("build log:\n{log}");
        }
        _ => {}
    }
    eprintln!("{err}");
}

//! `jpipe-smoke`: one-shot assemble-and-execute smoke run.
//!
//! Skips build verification: stages a source unit, runs the assembler,
//! hands the binary over, runs the interpreter, and prints whatever the
//! interpreter wrote. Dumps the assembler's streams when it fails.
//! Useful for poking the toolchain while iterating on a program.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use jpipe_core::{
    assembler_succeeded, stage_binary, stage_source, CargoProject, Capture, PipelineConfig,
    PipelineError, PipelineLayout, RunMode, Slot, Toolchain,
};

#[derive(Parser)]
#[command(
    name = "jpipe-smoke",
    version,
    about = "One-shot assemble-and-execute smoke run"
)]
struct Cli {
    /// Source unit to run; defaults to the configured default unit
    source: Option<String>,

    /// Working root containing the source directory and toolchain projects
    #[arg(long)]
    root: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = PipelineConfig::default();
    if let Some(root) = cli.root {
        config.root = root;
    }
    let source = cli.source.unwrap_or_else(|| config.default_source.clone());

    match smoke(&config.layout(), &source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn smoke(layout: &PipelineLayout, source: &str) -> Result<(), PipelineError> {
    stage_source(layout, source)?;

    println!("running assembler ...");
    let assembler = CargoProject::new(layout.assembler_dir());
    let capture = assembler.run(RunMode::Normal, Capture::Piped)?;

    if !assembler_succeeded(&capture.stdout) {
        if !capture.stderr.is_empty() {
            eprintln!("stderr:\n{}", capture.stderr);
        }
        if !capture.stdout.is_empty() {
            eprintln!("stdout:\n{}", capture.stdout);
        }
        eprintln!("early exit due to assembler error");
        return Err(PipelineError::AssembleFailed {
            stdout: capture.stdout,
            stderr: capture.stderr,
        });
    }

    stage_binary(layout)?;

    println!("running interpreter ...");
    let interpreter = CargoProject::new(layout.interpreter_dir());
    let run = interpreter.run(RunMode::Normal, Capture::Silenced)?;
    if !run.exit_ok {
        return Err(PipelineError::ExecutionFailed);
    }

    let output = layout.read_slot(Slot::InterpreterOutput)?;
    if !output.is_empty() {
        println!("interpreter output:\n{output}");
    }
    Ok(())
}

//! The pipeline orchestrator: sequences staging, build verification, and
//! run steps, aborting at the first failure.
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::layout::{PipelineLayout, Slot};
use crate::stager;
use crate::toolchain::{
    assembler_succeeded, BuildCheck, CargoProject, Capture, RunMode, Toolchain,
};

/// Observable pipeline progress.
///
/// `Idle → Staged → AssemblerBuilt → Assembled → InterpreterBuilt →
/// Executed → Done`, with any failure moving to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Staged,
    AssemblerBuilt,
    Assembled,
    InterpreterBuilt,
    Executed,
    Done,
    Failed,
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Text the interpreter wrote to its output slot.
    pub output: String,
}

/// Drives one source unit through the full toolchain.
///
/// The pipeline is strictly sequential: each stage's child process is
/// fully waited on, and no stage begins until the previous stage's
/// outcome is confirmed. There is no retry and no rollback; the first
/// failure aborts the run. One human-readable status line is printed per
/// stage outcome.
pub struct Pipeline {
    layout: PipelineLayout,
    assembler: Box<dyn Toolchain>,
    interpreter: Box<dyn Toolchain>,
    build_check: BuildCheck,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(
        layout: PipelineLayout,
        assembler: Box<dyn Toolchain>,
        interpreter: Box<dyn Toolchain>,
        build_check: BuildCheck,
    ) -> Self {
        Self {
            layout,
            assembler,
            interpreter,
            build_check,
            state: PipelineState::Idle,
        }
    }

    /// Builds a pipeline over the real cargo subsystems named by the
    /// configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let layout = config.layout();
        let assembler = Box::new(CargoProject::new(layout.assembler_dir()));
        let interpreter = Box::new(CargoProject::new(layout.interpreter_dir()));
        Self::new(layout, assembler, interpreter, config.build_check)
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Runs the full pipeline for the named source unit.
    pub fn run(&mut self, source: &str, mode: RunMode) -> Result<ExecutionResult, PipelineError> {
        match self.drive(source, mode) {
            Ok(result) => {
                self.state = PipelineState::Done;
                Ok(result)
            }
            Err(err) => {
                self.state = PipelineState::Failed;
                tracing::warn!(%err, "pipeline aborted");
                Err(err)
            }
        }
    }

    fn drive(&mut self, source: &str, mode: RunMode) -> Result<ExecutionResult, PipelineError> {
        self.state = PipelineState::Idle;

        stager::stage_source(&self.layout, source)?;
        self.state = PipelineState::Staged;

        let build = self.assembler.build(self.build_check)?;
        if !build.success {
            println!("checking assembler build... failed");
            return Err(PipelineError::BuildFailed {
                subsystem: "assembler".to_string(),
                diagnostic: build.diagnostic,
            });
        }
        println!("checking assembler build... OK");
        self.state = PipelineState::AssemblerBuilt;

        let capture = self.assembler.run(RunMode::Normal, Capture::Piped)?;
        if !assembler_succeeded(&capture.stdout) {
            println!("running assembler on {source}... failed");
            return Err(PipelineError::AssembleFailed {
                stdout: capture.stdout,
                stderr: capture.stderr,
            });
        }
        println!("running assembler on {source}... OK");
        self.state = PipelineState::Assembled;

        stager::stage_binary(&self.layout)?;
        let build = self.interpreter.build(self.build_check)?;
        if !build.success {
            println!("checking interpreter build... failed");
            return Err(PipelineError::BuildFailed {
                subsystem: "interpreter".to_string(),
                diagnostic: build.diagnostic,
            });
        }
        println!("checking interpreter build... OK");
        self.state = PipelineState::InterpreterBuilt;

        println!("running interpreter ...");
        let run = self.interpreter.run(mode, Capture::Silenced)?;
        if !run.exit_ok {
            println!("failed");
            return Err(PipelineError::ExecutionFailed);
        }
        self.state = PipelineState::Executed;

        let output = self.layout.read_slot(Slot::InterpreterOutput)?;
        println!("OK");
        Ok(ExecutionResult { output })
    }
}

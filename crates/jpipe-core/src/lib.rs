//! jpipe core: artifact slots, toolchain adapters, and the pipeline
//! orchestrator.
//!
//! A run stages a named assembly source unit into an external assembler
//! project, verifies that project builds, runs it and checks its success
//! sentinel, hands the produced binary to an external interpreter
//! project, verifies and runs that in turn, and reads the interpreter's
//! textual output back. The first failing stage aborts the run.
//!
//! # Example
//!
//! ```ignore
//! use jpipe_core::{Pipeline, PipelineConfig, RunMode};
//!
//! let config = PipelineConfig::default();
//! let mut pipeline = Pipeline::from_config(&config);
//! let result = pipeline.run("fib.asm", RunMode::Normal)?;
//! println!("{}", result.output);
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod orchestrator;
pub mod stager;
pub mod toolchain;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use layout::{PipelineLayout, Slot};
pub use orchestrator::{ExecutionResult, Pipeline, PipelineState};
pub use stager::{stage_binary, stage_source};
pub use toolchain::{
    assembler_succeeded, BuildCheck, BuildOutcome, CargoProject, Capture, RunMode, RunOutcome,
    Toolchain,
};

/// jpipe engine version.
pub const JPIPE_VERSION: &str = "0.1.0";

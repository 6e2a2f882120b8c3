//! Unified error model for pipeline runs.
use thiserror::Error;

/// Errors that abort a pipeline run.
///
/// Every variant is fatal. The orchestrator never retries a stage and
/// never salvages partial results: once an upstream stage is suspect,
/// downstream artifacts cannot be trusted.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The requested source unit does not exist in the source directory.
    #[error("SOURCE/no such source unit: {0}")]
    NotFound(String),

    /// A filesystem read or write in a staging step failed.
    #[error("IO/{context}: {source}")]
    IOFailure {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A subsystem's compilation step did not succeed.
    #[error("BUILD/{subsystem} build failed")]
    BuildFailed {
        subsystem: String,
        /// Captured build log or stream tail, when the verification
        /// variant produced one.
        diagnostic: Option<String>,
    },

    /// The assembler ran but its output did not end with the success
    /// sentinel.
    #[error("ASSEMBLE/assembler did not report success")]
    AssembleFailed {
        stdout: String,
        stderr: String,
    },

    /// The interpreter exited with a non-zero status.
    #[error("EXEC/interpreter exited with failure")]
    ExecutionFailed,
}

impl PipelineError {
    /// Wraps an I/O error with the staging operation it interrupted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IOFailure {
            context: context.into(),
            source,
        }
    }
}

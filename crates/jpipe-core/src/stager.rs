//! Staging steps: copy artifacts into the next subsystem's input slot.
use std::fs;
use std::io::ErrorKind;

use crate::error::PipelineError;
use crate::layout::{PipelineLayout, Slot};

/// Copies the named source unit verbatim into the assembler's input slot.
///
/// Fails with [`PipelineError::NotFound`] when the unit does not exist;
/// any other filesystem failure is fatal with no partial-write recovery.
pub fn stage_source(layout: &PipelineLayout, name: &str) -> Result<(), PipelineError> {
    let path = layout.source_path(name);
    let source = fs::read_to_string(&path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            PipelineError::NotFound(name.to_string())
        } else {
            PipelineError::io(format!("reading {}", path.display()), e)
        }
    })?;
    tracing::debug!(unit = name, "staging source into assembler input slot");
    layout.write_slot(Slot::AssemblerInput, &source)
}

/// Hands the assembler's binary artifact to the interpreter.
///
/// The artifact is copied verbatim, then the interpreter's output slot is
/// reset so a prior run's text can never be misattributed to this one.
/// Must only be called after a confirmed-successful assembler run; the
/// output slot may otherwise hold a stale artifact.
pub fn stage_binary(layout: &PipelineLayout) -> Result<(), PipelineError> {
    let binary = layout.read_slot(Slot::AssemblerOutput)?;
    layout.write_slot(Slot::InterpreterInput, &binary)?;
    layout.clear_slot(Slot::InterpreterOutput)
}

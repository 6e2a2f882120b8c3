//! Integration tests for the staging steps against a real filesystem.

use std::fs;

use jpipe_core::{stage_binary, stage_source, PipelineError, PipelineLayout, Slot};

fn fixture() -> (tempfile::TempDir, PipelineLayout) {
    let tmp = tempfile::tempdir().unwrap();
    for dir in ["asm", "assembler", "interpreter"] {
        fs::create_dir_all(tmp.path().join(dir)).unwrap();
    }
    let layout = PipelineLayout::new(tmp.path(), "asm", "assembler", "interpreter");
    (tmp, layout)
}

// =============================================================================
// Handoff fidelity
// =============================================================================

#[test]
fn test_binary_handoff_is_byte_identical() {
    let cases = [
        "",
        "0101",
        "0101\n",
        "line one\n\nline three\n",
        "no trailing newline",
        "tabs\tand\rcarriage returns\r\n",
    ];

    for contents in cases {
        let (_tmp, layout) = fixture();
        layout.write_slot(Slot::AssemblerOutput, contents).unwrap();

        stage_binary(&layout).unwrap();
        assert_eq!(
            layout.read_slot(Slot::InterpreterInput).unwrap(),
            contents,
            "handoff altered {contents:?}"
        );
    }
}

#[test]
fn test_source_staging_is_byte_identical() {
    let (tmp, layout) = fixture();
    let source = ":start\n  push 7\n  jmp :start\n";
    fs::write(tmp.path().join("asm/loop.asm"), source).unwrap();

    stage_source(&layout, "loop.asm").unwrap();
    assert_eq!(layout.read_slot(Slot::AssemblerInput).unwrap(), source);
}

// =============================================================================
// Output slot hygiene
// =============================================================================

#[test]
fn test_stage_binary_always_resets_output_slot() {
    let priors = ["", "42", "multi\nline\nresult\n"];
    for prior in priors {
        let (_tmp, layout) = fixture();
        layout.write_slot(Slot::AssemblerOutput, "0101").unwrap();
        layout.write_slot(Slot::InterpreterOutput, prior).unwrap();

        stage_binary(&layout).unwrap();
        assert_eq!(
            layout.read_slot(Slot::InterpreterOutput).unwrap(),
            "",
            "output slot kept {prior:?}"
        );
    }
}

#[test]
fn test_stage_binary_without_artifact_is_io_failure() {
    let (_tmp, layout) = fixture();
    let err = stage_binary(&layout).unwrap_err();
    assert!(matches!(err, PipelineError::IOFailure { .. }));
}

//! Pipeline configuration, resolved at the entry-point boundary.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::layout::PipelineLayout;
use crate::toolchain::{BuildCheck, RunMode};

/// Configuration for a pipeline run.
///
/// Defaults mirror the canonical on-disk layout of the toolchain. Entry
/// points override them from flags or a JSON file and pass the resolved
/// value to the orchestrator; nothing inside the pipeline reads ambient
/// defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Working root all other paths are relative to.
    pub root: PathBuf,
    /// Directory holding named source units.
    pub source_dir: PathBuf,
    /// Assembler project directory.
    pub assembler_dir: PathBuf,
    /// Interpreter project directory.
    pub interpreter_dir: PathBuf,
    /// Build verification variant.
    pub build_check: BuildCheck,
    /// Source unit used by entry points that allow omitting the name.
    pub default_source: String,
    /// Run mode used when none is requested.
    pub default_mode: RunMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            source_dir: PathBuf::from("asm"),
            assembler_dir: PathBuf::from("j_system/j_assembler"),
            interpreter_dir: PathBuf::from("j_system/j_interpreter"),
            build_check: BuildCheck::BuildLog,
            default_source: "in.asm".to_string(),
            default_mode: RunMode::Normal,
        }
    }
}

impl PipelineConfig {
    /// Loads a configuration from a JSON file; absent keys keep their
    /// defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Resolves the configured directories into a slot layout.
    pub fn layout(&self) -> PipelineLayout {
        PipelineLayout::new(
            &self.root,
            &self.source_dir,
            &self.assembler_dir,
            &self.interpreter_dir,
        )
    }
}

//! Per-file compilation, output path derivation and writing

use crate::compiler::{OutputStyle, StyleCompiler};
use crate::diagnostics::Diagnostics;
use crate::error::{PipelineError, Result};
use crate::types::{CompiledArtifact, ResolvedFile};
use crate::utils::{default_output_filename, join_public, public_parent};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Where compiled files land on disk and under which public path they are served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Configured `outputDir`, used as the public base URL
    public_dir: String,
    /// On-disk output root
    resolved_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(public_dir: impl Into<String>, resolved_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
            resolved_dir: resolved_dir.into(),
        }
    }

    pub fn public_dir(&self) -> &str {
        &self.public_dir
    }

    pub fn resolved_dir(&self) -> &Path {
        &self.resolved_dir
    }

    /// Create the output root and any missing parents.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.resolved_dir).map_err(|source| PipelineError::OutputDir {
            path: self.resolved_dir.clone(),
            source,
        })
    }

    pub fn output_filename(&self, file: &ResolvedFile) -> String {
        file.output_filename
            .clone()
            .unwrap_or_else(|| default_output_filename(&file.file_path))
    }

    /// Explicit filenames go next to the output root, the rest inside it.
    pub fn output_path(&self, file: &ResolvedFile) -> PathBuf {
        let filename = self.output_filename(file);
        match file.output_filename {
            Some(_) => self
                .resolved_dir
                .parent()
                .unwrap_or(self.resolved_dir.as_path())
                .join(filename),
            None => self.resolved_dir.join(filename),
        }
    }

    /// Public path mirroring [`OutputLayout::output_path`].
    pub fn public_path(&self, file: &ResolvedFile) -> String {
        let filename = self.output_filename(file);
        match file.output_filename {
            Some(_) => join_public(public_parent(&self.public_dir), &filename),
            None => join_public(&self.public_dir, &filename),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "camelCase")]
pub enum SkipReason {
    CompileFailed(String),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedFile {
    pub file_path: PathBuf,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct CompileOutcome {
    pub artifacts: Vec<CompiledArtifact>,
    pub skipped: Vec<SkippedFile>,
}

pub struct Orchestrator<'a> {
    root: &'a Path,
    layout: &'a OutputLayout,
    compiler: &'a dyn StyleCompiler,
}

impl<'a> Orchestrator<'a> {
    pub fn new(root: &'a Path, layout: &'a OutputLayout, compiler: &'a dyn StyleCompiler) -> Self {
        Self {
            root,
            layout,
            compiler,
        }
    }

    /// Compile `files` one at a time, in order.
    ///
    /// Compiler failures and empty outputs skip the file and the batch
    /// continues. A failed write aborts the batch; files written before it
    /// stay on disk.
    pub fn compile_all(&self, files: &[ResolvedFile], diag: &dyn Diagnostics) -> Result<CompileOutcome> {
        let mut outcome = CompileOutcome::default();

        for file in files {
            match self.compile_one(file, diag)? {
                Ok(artifact) => outcome.artifacts.push(artifact),
                Err(reason) => outcome.skipped.push(SkippedFile {
                    file_path: file.file_path.clone(),
                    reason,
                }),
            }
        }

        Ok(outcome)
    }

    fn compile_one(
        &self,
        file: &ResolvedFile,
        diag: &dyn Diagnostics,
    ) -> Result<std::result::Result<CompiledArtifact, SkipReason>> {
        let source = self.root.join(&file.file_path);
        let output_path = self.layout.output_path(file);

        let output = match self.compiler.compile(&source, OutputStyle::Compressed) {
            Ok(output) => output,
            Err(e) => {
                diag.error(&format!(
                    "Failed to compile \"{}\": {}",
                    file.file_path.display(),
                    e
                ));
                return Ok(Err(SkipReason::CompileFailed(e.to_string())));
            }
        };

        if output.is_empty() {
            diag.warn(&format!(
                "\"{}\" is empty, skipping file",
                file.file_path.display()
            ));
            return Ok(Err(SkipReason::Empty));
        }

        diag.debug(&format!("Compiled successfully {}", output_path.display()));

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|source| PipelineError::Write {
                path: output_path.clone(),
                source,
            })?;
        }
        fs::write(&output_path, &output.css).map_err(|source| PipelineError::Write {
            path: output_path.clone(),
            source,
        })?;

        diag.debug(&format!("Compiled file stored in {}", output_path.display()));

        Ok(Ok(CompiledArtifact {
            path: self.layout.public_path(file),
            rules: file.rules.clone(),
        }))
    }
}

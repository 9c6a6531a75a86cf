//! Builds the set of files to compile from the explicit list and the input directory

use crate::diagnostics::Diagnostics;
use crate::error::{PipelineError, Result};
use crate::rules::resolve_rules;
use crate::types::{FileOrigin, ResolvedFile, RuleSet, SourceFileSpec};
use crate::utils::normalize_path;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct FileSetBuilder<'a> {
    root: &'a Path,
    global_rules: &'a RuleSet,
}

impl<'a> FileSetBuilder<'a> {
    /// `root` is the project root that explicit paths and `input_dir` are relative to.
    pub fn new(root: &'a Path, global_rules: &'a RuleSet) -> Self {
        Self { root, global_rules }
    }

    /// Combine `explicit` with a recursive scan of `input_dir`.
    ///
    /// When `explicit` is non-empty and no `input_dir` is given the scan is
    /// skipped and every explicit entry is returned as is, rules merged.
    /// Otherwise entries are keyed by normalized path: explicit files first,
    /// then discovered files that don't collide with them.
    pub fn build(
        &self,
        explicit: &[SourceFileSpec],
        input_dir: Option<&Path>,
        diag: &dyn Diagnostics,
    ) -> Result<Vec<ResolvedFile>> {
        let input_dir = match input_dir {
            Some(dir) => dir,
            None => {
                if !explicit.is_empty() {
                    diag.debug("No input directory configured, using explicit files only");
                }
                return Ok(explicit.iter().map(|spec| self.resolve_explicit(spec)).collect());
            }
        };

        let mut seen = HashSet::new();
        let mut files = Vec::with_capacity(explicit.len());

        for spec in explicit {
            if seen.insert(normalize_path(&spec.file_path)) {
                files.push(self.resolve_explicit(spec));
            } else {
                diag.warn(&format!(
                    "File {} is listed more than once in \"files\". Skipping duplicate entry",
                    spec.file_path.display()
                ));
            }
        }

        for path in self.discover(input_dir)? {
            if seen.insert(normalize_path(&path)) {
                files.push(ResolvedFile {
                    file_path: path,
                    output_filename: None,
                    rules: self.global_rules.clone(),
                    origin: FileOrigin::Discovered,
                });
            } else {
                diag.warn(&format!(
                    "You manually included a file in \"files\" that also exists in the directory you defined with \"inputDir\". Skipping duplicate file {}",
                    path.display()
                ));
            }
        }

        diag.debug(&format!("Resolved {} file(s) to process", files.len()));
        Ok(files)
    }

    fn resolve_explicit(&self, spec: &SourceFileSpec) -> ResolvedFile {
        ResolvedFile {
            file_path: spec.file_path.clone(),
            output_filename: spec.output_filename.clone(),
            rules: resolve_rules(self.global_rules, &spec.rules),
            origin: FileOrigin::Explicit,
        }
    }

    /// Every non-directory entry under `input_dir`, relative to the root.
    fn discover(&self, input_dir: &Path) -> Result<Vec<PathBuf>> {
        let dir = self.root.join(input_dir);
        let mut paths = Vec::new();

        for entry in WalkDir::new(&dir).sort_by_file_name() {
            let entry = entry.map_err(|e| PipelineError::discovery(&dir, e.to_string()))?;
            if entry.file_type().is_dir() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(self.root)
                .unwrap_or_else(|_| entry.path());
            paths.push(relative.to_path_buf());
        }

        Ok(paths)
    }
}

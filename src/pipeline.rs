//! Top-level pipeline: resolve files, compile them, publish the artifacts

use crate::compiler::StyleCompiler;
use crate::config::ModuleOptions;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::file_set::FileSetBuilder;
use crate::orchestrator::{OutputLayout, Orchestrator, SkipReason, SkippedFile};
use crate::publish::{publish, AssetHost};
use crate::types::{CompiledArtifact, ResolvedFile};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStats {
    pub resolved_files: usize,
    pub compiled: usize,
    pub failed: usize,
    pub empty: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub artifacts: Vec<CompiledArtifact>,
    pub skipped: Vec<SkippedFile>,
    pub stats: BuildStats,
}

/// One configured run against a project root.
///
/// Runs are sequential and non-atomic. Do not run two pipelines against the
/// same output directory at the same time.
pub struct Pipeline<'a> {
    options: &'a ModuleOptions,
    root: PathBuf,
    compiler: &'a dyn StyleCompiler,
}

impl<'a> Pipeline<'a> {
    pub fn new(options: &'a ModuleOptions, root: impl Into<PathBuf>, compiler: &'a dyn StyleCompiler) -> Self {
        Self {
            options,
            root: root.into(),
            compiler,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(
            self.options.output_dir.clone(),
            self.options.resolved_output_dir(&self.root),
        )
    }

    /// The deduplicated, rule-annotated file set, without compiling anything.
    pub fn resolve_files(&self, diag: &dyn Diagnostics) -> Result<Vec<ResolvedFile>> {
        let global_rules = self.options.rules();
        let explicit = self.options.source_files();
        let input_dir = self.options.effective_input_dir();

        FileSetBuilder::new(&self.root, &global_rules).build(&explicit, input_dir.as_deref(), diag)
    }

    /// Run every step. Any returned error is fatal; per-file problems are
    /// reported through `diag` and in the report.
    pub fn run(&self, host: &mut dyn AssetHost, diag: &dyn Diagnostics) -> Result<PipelineReport> {
        if self.options.is_empty() {
            diag.warn("No files were defined. Stopping");
            return Ok(PipelineReport::default());
        }
        self.options.validate()?;

        let start_time = Instant::now();
        let layout = self.layout();
        layout.prepare()?;
        diag.debug(&format!("Output directory {}", layout.resolved_dir().display()));

        let files = self.resolve_files(diag)?;
        let outcome = Orchestrator::new(&self.root, &layout, self.compiler).compile_all(&files, diag)?;

        publish(host, &layout, &outcome.artifacts, self.options.plugin, diag);

        let stats = BuildStats {
            resolved_files: files.len(),
            compiled: outcome.artifacts.len(),
            failed: count(&outcome.skipped, |r| matches!(r, SkipReason::CompileFailed(_))),
            empty: count(&outcome.skipped, |r| *r == SkipReason::Empty),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };
        diag.log("Compilation finished");
        log::debug!("Build stats: {:?}", stats);

        Ok(PipelineReport {
            artifacts: outcome.artifacts,
            skipped: outcome.skipped,
            stats,
        })
    }
}

fn count(skipped: &[SkippedFile], pred: impl Fn(&SkipReason) -> bool) -> usize {
    skipped.iter().filter(|s| pred(&s.reason)).count()
}

/// Host-facing wrapper: a fatal error is logged through `diag` and the
/// host build carries on without this feature.
pub fn lazy_load_css(
    options: &ModuleOptions,
    root: &Path,
    compiler: &dyn StyleCompiler,
    host: &mut dyn AssetHost,
    diag: &dyn Diagnostics,
) -> Option<PipelineReport> {
    match Pipeline::new(options, root, compiler).run(host, diag) {
        Ok(report) => Some(report),
        Err(e) => {
            diag.error(&e.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{CompileOutput, SassCompiler, OutputStyle};
    use crate::config::FileEntry;
    use crate::diagnostics::CapturedDiagnostics;
    use crate::error::{CompileError, PipelineError};
    use crate::publish::RecordingHost;
    use crate::types::{Rule, RuleSet, ScreenSize, RUNTIME_CONFIG_KEY};
    use log::Level;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn entry(path: &str) -> FileEntry {
        FileEntry {
            file_path: PathBuf::from(path),
            output_filename: None,
            width_gt: None,
            width_lt: None,
        }
    }

    #[test]
    fn test_end_to_end_directory_scan() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "styles/a.scss", "$c: red;\na {\n  color: $c;\n}\n");
        write(temp_dir.path(), "styles/b.scss", "");

        let options = ModuleOptions {
            input_dir: Some(PathBuf::from("styles")),
            width_lt: Some(ScreenSize { width: 600 }),
            ..Default::default()
        };
        let compiler = SassCompiler::new();
        let mut host = RecordingHost::new();
        let diag = CapturedDiagnostics::new();

        let report = Pipeline::new(&options, temp_dir.path(), &compiler)
            .run(&mut host, &diag)
            .unwrap();

        let expected = vec![CompiledArtifact {
            path: "assets/css/a.css".to_string(),
            rules: RuleSet::new().with(Rule::width_lt(600)),
        }];
        assert_eq!(report.artifacts, expected);
        assert_eq!(host.runtime_config(RUNTIME_CONFIG_KEY), Some(&expected[..]));
        assert_eq!(report.stats.resolved_files, 2);
        assert_eq!(report.stats.empty, 1);
        assert_eq!(diag.count(Level::Warn), 1);

        let out_dir = options.resolved_output_dir(temp_dir.path());
        assert_eq!(
            fs::read_to_string(out_dir.join("a.css")).unwrap().trim_end(),
            "a{color:red}"
        );
        assert!(!out_dir.join("b.css").exists());
        assert_eq!(host.public_assets()[0].dir, out_dir);
        assert_eq!(host.public_assets()[0].base_url, "assets/css");
    }

    #[test]
    fn test_empty_config_is_a_no_op() {
        let temp_dir = TempDir::new().unwrap();
        let options = ModuleOptions::default();
        let compiler = SassCompiler::new();
        let mut host = RecordingHost::new();
        let diag = CapturedDiagnostics::new();

        let report = Pipeline::new(&options, temp_dir.path(), &compiler)
            .run(&mut host, &diag)
            .unwrap();

        assert!(report.artifacts.is_empty());
        assert_eq!(diag.entries().len(), 1);
        assert_eq!(diag.count(Level::Warn), 1);
        assert!(host.public_assets().is_empty());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_explicit_files_skip_directory_scan() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "app/assets/scss/unlisted.scss", "b{color:blue}");
        write(temp_dir.path(), "one.scss", "a{color:red}");

        let options = ModuleOptions {
            files: vec![entry("one.scss")],
            ..Default::default()
        };
        let compiler = SassCompiler::new();
        let diag = CapturedDiagnostics::new();

        let files = Pipeline::new(&options, temp_dir.path(), &compiler)
            .resolve_files(&diag)
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_path, PathBuf::from("one.scss"));
    }

    #[test]
    fn test_plugin_disabled_publishes_assets_only() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "one.scss", "a{color:red}");

        let options = ModuleOptions {
            files: vec![entry("one.scss")],
            plugin: false,
            ..Default::default()
        };
        let compiler = SassCompiler::new();
        let mut host = RecordingHost::new();
        let diag = CapturedDiagnostics::new();

        let report = Pipeline::new(&options, temp_dir.path(), &compiler)
            .run(&mut host, &diag)
            .unwrap();

        assert_eq!(report.artifacts.len(), 1);
        assert_eq!(host.public_assets().len(), 1);
        assert!(host.runtime_config(RUNTIME_CONFIG_KEY).is_none());
        assert!(host.plugins().is_empty());
    }

    #[test]
    fn test_compile_failure_does_not_abort_batch() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "styles/a.scss", "");
        write(temp_dir.path(), "styles/bad.scss", "");
        write(temp_dir.path(), "styles/c.scss", "");

        let compiler = |source: &Path, _: OutputStyle| -> std::result::Result<CompileOutput, CompileError> {
            if source.ends_with("bad.scss") {
                Err(CompileError::NoResult)
            } else {
                Ok(CompileOutput::new("x{y:z}"))
            }
        };
        let options = ModuleOptions {
            input_dir: Some(PathBuf::from("styles")),
            ..Default::default()
        };
        let mut host = RecordingHost::new();
        let diag = CapturedDiagnostics::new();

        let report = Pipeline::new(&options, temp_dir.path(), &compiler)
            .run(&mut host, &diag)
            .unwrap();

        let paths: Vec<_> = report.artifacts.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["assets/css/a.css", "assets/css/c.css"]);
        assert_eq!(report.stats.failed, 1);
        assert_eq!(diag.count(Level::Error), 1);
    }

    #[test]
    fn test_missing_input_dir_is_fatal_and_unpublished() {
        let temp_dir = TempDir::new().unwrap();
        let options = ModuleOptions {
            input_dir: Some(PathBuf::from("nope")),
            ..Default::default()
        };
        let compiler = SassCompiler::new();
        let mut host = RecordingHost::new();
        let diag = CapturedDiagnostics::new();

        let result = Pipeline::new(&options, temp_dir.path(), &compiler).run(&mut host, &diag);
        assert!(matches!(result, Err(PipelineError::Discovery { .. })));
        assert!(host.public_assets().is_empty());

        let report = lazy_load_css(&options, temp_dir.path(), &compiler, &mut host, &diag);
        assert!(report.is_none());
        assert_eq!(diag.count(Level::Error), 1);
        assert!(host.public_assets().is_empty());
    }
}

//! lazycss - build-time stylesheet pipeline with deferred-loading rules
//!
//! Discovers stylesheet sources, compiles them to compressed CSS, tags each
//! output with the rules a runtime loader uses to decide when to apply it,
//! and hands the result to the host build system.
//!
//! # Basic Usage
//!
//! ```no_run
//! use lazycss::{LogDiagnostics, Pipeline, RecordingHost, Result, SassCompiler};
//!
//! fn main() -> Result<()> {
//!     let options = lazycss::config::load("lazycss.toml".as_ref())?;
//!     let compiler = SassCompiler::new();
//!     let mut host = RecordingHost::new();
//!
//!     let report = Pipeline::new(&options, ".", &compiler).run(&mut host, &LogDiagnostics::default())?;
//!     println!("{} stylesheet(s) published", report.artifacts.len());
//!     Ok(())
//! }
//! ```
//!
//! # Pipeline
//!
//! 1. **File set** - explicit files and a recursive scan of `inputDir`,
//!    deduplicated by separator-insensitive path, rules merged per file
//! 2. **Compilation** - one file at a time; failures and empty outputs are
//!    logged and skipped
//! 3. **Publication** - output root registered as public assets, artifact
//!    list and loader script handed to the host

pub mod cli;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod file_set;
pub mod orchestrator;
pub mod pipeline;
pub mod publish;
pub mod rules;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use cli::Cli;
pub use compiler::{CompileOutput, OutputStyle, SassCompiler, StyleCompiler};
pub use config::{FileEntry, ModuleOptions};
pub use diagnostics::{CapturedDiagnostics, Diagnostics, LogDiagnostics};
pub use error::{CompileError, PipelineError, Result};
pub use file_set::FileSetBuilder;
pub use orchestrator::{CompileOutcome, Orchestrator, OutputLayout, SkipReason, SkippedFile};
pub use pipeline::{lazy_load_css, BuildStats, Pipeline, PipelineReport};
pub use publish::{
    publish, AssetHost, ClientPlugin, PluginMode, PublicAssetDir, RecordingHost, MANIFEST_FILE,
};
pub use rules::resolve_rules;
pub use types::*;
pub use utils::normalize_path;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

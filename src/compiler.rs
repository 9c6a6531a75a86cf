//! Style compiler boundary and the Sass-backed implementation

use crate::error::CompileError;
use std::fs;
use std::path::Path;

/// Output formatting requested from the compiler. Published stylesheets are
/// always compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    #[default]
    Compressed,
}

impl OutputStyle {
    fn to_grass(self) -> grass::OutputStyle {
        match self {
            OutputStyle::Compressed => grass::OutputStyle::Compressed,
        }
    }
}

/// Text produced by a successful compilation. May be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompileOutput {
    pub css: String,
}

impl CompileOutput {
    pub fn new(css: impl Into<String>) -> Self {
        Self { css: css.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.css.is_empty()
    }
}

/// Turns one source file into stylesheet text.
///
/// Called once per file, synchronously. Failures are reported by the
/// orchestrator and never retried.
pub trait StyleCompiler {
    fn compile(&self, source: &Path, style: OutputStyle) -> Result<CompileOutput, CompileError>;
}

impl<F> StyleCompiler for F
where
    F: Fn(&Path, OutputStyle) -> Result<CompileOutput, CompileError>,
{
    fn compile(&self, source: &Path, style: OutputStyle) -> Result<CompileOutput, CompileError> {
        self(source, style)
    }
}

/// Compiles Sass (`.scss`, `.sass`) and plain CSS with `grass`.
///
/// Variables, mixins and nesting are resolved; imports are looked up
/// relative to the source file.
#[derive(Debug, Clone, Copy, Default)]
pub struct SassCompiler;

impl SassCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Compile SCSS source text.
    pub fn compile_str(&self, source: &str, style: OutputStyle) -> Result<CompileOutput, CompileError> {
        let options = grass::Options::default().style(style.to_grass());
        grass::from_string(source.to_string(), &options)
            .map(CompileOutput::new)
            .map_err(|e| CompileError::Parse {
                message: e.to_string(),
            })
    }
}

impl StyleCompiler for SassCompiler {
    fn compile(&self, source: &Path, style: OutputStyle) -> Result<CompileOutput, CompileError> {
        fs::metadata(source).map_err(|e| CompileError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;

        let options = grass::Options::default().style(style.to_grass());
        grass::from_path(source, &options)
            .map(CompileOutput::new)
            .map_err(|e| CompileError::Parse {
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn compressed(source: &str) -> String {
        SassCompiler::new()
            .compile_str(source, OutputStyle::Compressed)
            .unwrap()
            .css
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_compressed_output() {
        assert_eq!(compressed("a {\n  color: red;\n}\n"), "a{color:red}");
    }

    #[test]
    fn test_variables_and_line_comments() {
        assert_eq!(compressed("$primary: red;\na { color: $primary; }"), "a{color:red}");
        assert_eq!(compressed("// line comment\na { color: red; }"), "a{color:red}");
    }

    #[test]
    fn test_mixins_are_expanded() {
        assert_eq!(
            compressed("@mixin m { color: red; }\na { @include m; }"),
            "a{color:red}"
        );
    }

    #[test]
    fn test_nesting_is_flattened() {
        assert_eq!(compressed("a { &:hover { color: red; } }"), "a:hover{color:red}");
        assert_eq!(compressed("nav { ul { margin: 0; } }"), "nav ul{margin:0}");
    }

    #[test]
    fn test_syntax_error() {
        let result = SassCompiler::new().compile_str("a { color: red", OutputStyle::Compressed);
        assert!(matches!(result, Err(CompileError::Parse { .. })));
    }

    #[test]
    fn test_empty_source_gives_empty_output() {
        let out = SassCompiler::new()
            .compile_str("", OutputStyle::Compressed)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_compile_file_with_import() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("_colors.scss"), "$accent: red;\n").unwrap();
        let main = temp_dir.path().join("main.scss");
        fs::write(&main, "@import 'colors';\n.btn { color: $accent; }\n").unwrap();

        let out = SassCompiler::new()
            .compile(&main, OutputStyle::Compressed)
            .unwrap();
        assert_eq!(out.css.trim_end(), ".btn{color:red}");
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = SassCompiler::new()
            .compile(&temp_dir.path().join("missing.scss"), OutputStyle::Compressed);
        assert!(matches!(result, Err(CompileError::Read { .. })));
    }

    #[test]
    fn test_closure_compiler() {
        let compiler = |_: &Path, style: OutputStyle| -> Result<CompileOutput, CompileError> {
            assert_eq!(style, OutputStyle::Compressed);
            Ok(CompileOutput::new("b{}"))
        };
        let out = compiler
            .compile(Path::new("x.scss"), OutputStyle::Compressed)
            .unwrap();
        assert_eq!(out.css, "b{}");
    }
}

//! Pipeline options and JSON/TOML loading

use crate::error::{PipelineError, Result};
use crate::types::{
    RuleFields, RuleSet, ScreenSize, SourceFileSpec, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One entry of the `files` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileEntry {
    /// Relative to the project root
    pub file_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,
    #[serde(rename = "widthGT", default, skip_serializing_if = "Option::is_none")]
    pub width_gt: Option<ScreenSize>,
    #[serde(rename = "widthLT", default, skip_serializing_if = "Option::is_none")]
    pub width_lt: Option<ScreenSize>,
}

impl From<&FileEntry> for SourceFileSpec {
    fn from(entry: &FileEntry) -> Self {
        SourceFileSpec {
            file_path: entry.file_path.clone(),
            output_filename: entry.output_filename.clone(),
            rules: RuleFields {
                width_gt: entry.width_gt,
                width_lt: entry.width_lt,
            }
            .into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModuleOptions {
    /// Directory scanned recursively for sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_dir: Option<PathBuf>,
    /// Output root, also the public base URL
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    /// Publish artifact metadata and register the runtime loader
    #[serde(default = "default_plugin")]
    pub plugin: bool,
    #[serde(rename = "widthGT", default, skip_serializing_if = "Option::is_none")]
    pub width_gt: Option<ScreenSize>,
    #[serde(rename = "widthLT", default, skip_serializing_if = "Option::is_none")]
    pub width_lt: Option<ScreenSize>,
    /// On-disk namespace the output root is placed under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_plugin() -> bool {
    true
}

impl Default for ModuleOptions {
    fn default() -> Self {
        Self {
            input_dir: None,
            output_dir: default_output_dir(),
            files: Vec::new(),
            plugin: default_plugin(),
            width_gt: None,
            width_lt: None,
            cache_dir: None,
        }
    }
}

impl ModuleOptions {
    /// Global rules
    pub fn rules(&self) -> RuleSet {
        RuleFields {
            width_gt: self.width_gt,
            width_lt: self.width_lt,
        }
        .into()
    }

    pub fn source_files(&self) -> Vec<SourceFileSpec> {
        self.files.iter().map(SourceFileSpec::from).collect()
    }

    /// Nothing to do: no files, no rules and no input directory asked for.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.rules().is_empty() && self.input_dir.is_none()
    }

    /// Directory to scan. Falls back to the conventional source directory
    /// only when no explicit files are configured.
    pub fn effective_input_dir(&self) -> Option<PathBuf> {
        match &self.input_dir {
            Some(dir) => Some(dir.clone()),
            None if self.files.is_empty() => Some(PathBuf::from(DEFAULT_INPUT_DIR)),
            None => None,
        }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| Path::new(".cache").join(crate::NAME).join(crate::VERSION))
    }

    /// On-disk output root for a project rooted at `root`.
    pub fn resolved_output_dir(&self, root: &Path) -> PathBuf {
        root.join(self.cache_dir()).join(&self.output_dir)
    }

    pub fn validate(&self) -> Result<()> {
        if self.output_dir.trim().is_empty() {
            return Err(PipelineError::config("\"outputDir\" must not be empty"));
        }
        for entry in &self.files {
            if entry.file_path.as_os_str().is_empty() {
                return Err(PipelineError::config("\"filePath\" must not be empty"));
            }
            if matches!(&entry.output_filename, Some(name) if name.trim().is_empty()) {
                return Err(PipelineError::config(format!(
                    "\"outputFilename\" for {} must not be empty",
                    entry.file_path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Load options from a `.json` or `.toml` file.
pub fn load(config_path: &Path) -> Result<ModuleOptions> {
    log::info!("Loading configuration from {}", config_path.display());
    let content = fs::read_to_string(config_path).map_err(|e| {
        PipelineError::config(format!("Config file {}: {}", config_path.display(), e))
    })?;

    let options: ModuleOptions = match config_path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .map_err(|e| PipelineError::config(format!("Invalid JSON config: {}", e)))?,
        Some("toml") => toml::from_str(&content)
            .map_err(|e| PipelineError::config(format!("Invalid TOML config: {}", e)))?,
        _ => {
            return Err(PipelineError::config(
                "Config file must be .json or .toml format",
            ))
        }
    };

    options.validate()?;
    Ok(options)
}

/// Starter configuration written by `lazycss init`.
pub fn starter_toml() -> String {
    format!(
        r#"# lazycss configuration
inputDir = "{input}"
outputDir = "{output}"
plugin = true

# Defer every stylesheet until the viewport is narrower than 600px
# [widthLT]
# width = 600

# [[files]]
# filePath = "{input}/print.scss"
# outputFilename = "print.css"
# widthGT = {{ width = 1024 }}
"#,
        input = DEFAULT_INPUT_DIR,
        output = DEFAULT_OUTPUT_DIR,
    )
}

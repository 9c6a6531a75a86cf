//! Error types for the lazycss pipeline

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal errors. Any of these stops the pipeline before publication.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Cannot read input directory {}: {message}", .path.display())]
    Discovery { path: PathBuf, message: String },

    #[error("Cannot create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest error: {message}")]
    Manifest { message: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn discovery(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Discovery {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    pub fn manifest(message: impl Into<String>) -> Self {
        Self::Manifest {
            message: message.into(),
        }
    }
}

/// Per-file compiler failure. Reported and skipped, never fatal.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    Parse { message: String },

    #[error("compiler produced no result")]
    NoResult,
}

//! Diagnostics sink passed explicitly into a pipeline run

use log::Level;
use std::cell::RefCell;

/// Receives the pipeline's warnings, errors and progress messages.
pub trait Diagnostics {
    fn emit(&self, level: Level, message: &str);

    fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }

    fn warn(&self, message: &str) {
        self.emit(Level::Warn, message);
    }

    fn log(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    fn debug(&self, message: &str) {
        self.emit(Level::Debug, message);
    }
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Clone)]
pub struct LogDiagnostics {
    target: String,
}

impl LogDiagnostics {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Default for LogDiagnostics {
    fn default() -> Self {
        Self::new(format!("{}:{}", crate::NAME, crate::VERSION))
    }
}

impl Diagnostics for LogDiagnostics {
    fn emit(&self, level: Level, message: &str) {
        log::log!(target: self.target.as_str(), level, "{}", message);
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CapturedDiagnostics {
    entries: RefCell<Vec<(Level, String)>>,
}

impl CapturedDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.borrow().clone()
    }

    pub fn count(&self, level: Level) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Diagnostics for CapturedDiagnostics {
    fn emit(&self, level: Level, message: &str) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}

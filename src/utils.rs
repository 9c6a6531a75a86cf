//! Path helpers used by the file set builder and the orchestrator

use crate::types::OUTPUT_EXTENSION;
use std::path::Path;

/// Strip every `/` and `\` so the same file yields the same key no matter
/// which separator convention produced the path.
pub fn normalize_path(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .to_string_lossy()
        .chars()
        .filter(|c| !matches!(c, '/' | '\\'))
        .collect()
}

/// Source base name with its extension replaced by `.css`.
pub fn default_output_filename(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}.{}", stem, OUTPUT_EXTENSION)
}

/// Join a public base path and a filename with `/`.
pub fn join_public(base: &str, filename: &str) -> String {
    let base = base.trim_end_matches(['/', '\\']);
    let filename = filename.replace('\\', "/");
    if base.is_empty() {
        filename
    } else {
        format!("{}/{}", base.replace('\\', "/"), filename)
    }
}

/// Parent of a `/`-separated public path, `""` at the top level.
pub fn public_parent(base: &str) -> &str {
    base.trim_end_matches(['/', '\\'])
        .rsplit_once(['/', '\\'])
        .map(|(parent, _)| parent)
        .unwrap_or("")
}

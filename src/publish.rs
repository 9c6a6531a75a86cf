//! Hand-off of compiled artifacts to the host build system

use crate::diagnostics::Diagnostics;
use crate::error::{PipelineError, Result};
use crate::orchestrator::OutputLayout;
use crate::types::{CompiledArtifact, RUNTIME_CONFIG_KEY};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Source of the client-side loader that applies the rules at runtime
pub const LOADER_SCRIPT: &str = "runtime/plugin";

/// File name of the manifest written by [`RecordingHost::write_manifest`]
pub const MANIFEST_FILE: &str = "lazycss.manifest.json";

/// A directory served statically under `base_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAssetDir {
    pub dir: PathBuf,
    pub base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginMode {
    Client,
}

/// Script registration for the host's plugin list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientPlugin {
    pub mode: PluginMode,
    pub name: String,
    pub src: PathBuf,
    /// Run after the plugins already registered
    pub append: bool,
}

impl ClientPlugin {
    pub fn loader() -> Self {
        Self {
            mode: PluginMode::Client,
            name: format!("{}.client.js", crate::NAME),
            src: PathBuf::from(LOADER_SCRIPT),
            append: true,
        }
    }
}

/// What the pipeline needs from the host build system.
pub trait AssetHost {
    fn add_public_assets(&mut self, assets: PublicAssetDir);

    /// Expose `artifacts` to the runtime consumer under `key`.
    fn set_runtime_config(&mut self, key: &str, artifacts: &[CompiledArtifact]);

    fn add_plugin(&mut self, plugin: ClientPlugin);
}

/// Register the output root and, when `plugin` is set, the artifact list
/// and the loader script.
pub fn publish(
    host: &mut dyn AssetHost,
    layout: &OutputLayout,
    artifacts: &[CompiledArtifact],
    plugin: bool,
    diag: &dyn Diagnostics,
) {
    host.add_public_assets(PublicAssetDir {
        dir: layout.resolved_dir().to_path_buf(),
        base_url: layout.public_dir().to_string(),
    });
    diag.debug("Styles added to public assets directory");

    if plugin {
        diag.debug("Registering plugin");
        host.set_runtime_config(RUNTIME_CONFIG_KEY, artifacts);
        host.add_plugin(ClientPlugin::loader());
    }
}

/// In-memory host. Keeps every registration and can persist them as JSON.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingHost {
    public_assets: Vec<PublicAssetDir>,
    runtime_config: BTreeMap<String, Vec<CompiledArtifact>>,
    plugins: Vec<ClientPlugin>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn public_assets(&self) -> &[PublicAssetDir] {
        &self.public_assets
    }

    pub fn runtime_config(&self, key: &str) -> Option<&[CompiledArtifact]> {
        self.runtime_config.get(key).map(Vec::as_slice)
    }

    pub fn plugins(&self) -> &[ClientPlugin] {
        &self.plugins
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PipelineError::manifest(format!("JSON serialization error: {}", e)))
    }

    pub fn write_manifest(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json).map_err(|source| PipelineError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl AssetHost for RecordingHost {
    fn add_public_assets(&mut self, assets: PublicAssetDir) {
        self.public_assets.push(assets);
    }

    fn set_runtime_config(&mut self, key: &str, artifacts: &[CompiledArtifact]) {
        self.runtime_config.insert(key.to_string(), artifacts.to_vec());
    }

    fn add_plugin(&mut self, plugin: ClientPlugin) {
        self.plugins.push(plugin);
    }
}

//! Plugin manifest definition

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::application::errors::PluginError;

/// Manifest file name inside a plugin directory
pub const MANIFEST_FILE: &str = "plugin.yaml";

/// Dot-separated namespaces: `custom_pkg`, `custom_pkg.greet`
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*(\.[a-z][a-z0-9_]*)*$").unwrap());

/// Plugin metadata
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginManifest {
    pub name: String,

    pub version: String,

    pub description: Option<String>,

    pub author: Option<String>,

    /// Path to the shared library, relative to the plugin directory
    pub library: Option<PathBuf>,
}

impl PluginManifest {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PluginError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PluginError::Load(format!("Failed to read manifest: {}", e)))?;

        let manifest: Self = serde_yaml::from_str(&content)
            .map_err(|e| PluginError::Load(format!("Failed to parse manifest: {}", e)))?;
        validate_name(&manifest.name)?;
        Ok(manifest)
    }
}

pub fn validate_name(name: &str) -> Result<(), PluginError> {
    if NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(PluginError::Load(format!("Invalid plugin name: {}", name)))
    }
}

/// Directory a namespaced plugin resolves to under the plugins root
pub fn plugin_dir(root: &Path, name: &str) -> PathBuf {
    let mut dir = root.to_path_buf();
    for part in name.split('.') {
        dir.push(part);
    }
    dir
}

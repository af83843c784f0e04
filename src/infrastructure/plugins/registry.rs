//! Plugin registry - Owns loaded plugins and implements the host capability

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{info, warn};

use crate::application::errors::PluginError;
use crate::domain::traits::{PluginHost, PluginInfo};

use super::loader::{self, LoadedPlugin};
use super::manifest::{plugin_dir, validate_name, MANIFEST_FILE};

pub struct PluginRegistry {
    root: PathBuf,
    plugins: RwLock<HashMap<String, LoadedPlugin>>,
}

impl PluginRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            plugins: RwLock::new(HashMap::new()),
        }
    }

    /// Load every plugin directory found under the root
    ///
    /// A directory is a plugin when it carries a manifest; failures are
    /// logged and skipped so one broken plugin cannot block the rest.
    pub fn load_all(&self) -> Result<usize, PluginError> {
        if !self.root.exists() {
            warn!(
                "Plugin directory does not exist: {}",
                self.root.display()
            );
            return Ok(0);
        }

        let mut dirs = Vec::new();
        if let Err(e) = scan(&self.root, &mut dirs) {
            return Err(PluginError::Load(format!(
                "Failed to scan plugin directory: {}",
                e
            )));
        }

        let mut loaded = 0;
        for dir in dirs {
            match loader::load_plugin(&dir) {
                Ok(plugin) => {
                    let name = plugin.manifest().name.clone();
                    self.write()?.insert(name, plugin);
                    loaded += 1;
                }
                Err(e) => {
                    warn!("Failed to load plugin from {}: {}", dir.display(), e);
                }
            }
        }
        Ok(loaded)
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, LoadedPlugin>>, PluginError> {
        self.plugins
            .read()
            .map_err(|_| PluginError::Internal("Lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, LoadedPlugin>>, PluginError> {
        self.plugins
            .write()
            .map_err(|_| PluginError::Internal("Lock poisoned".to_string()))
    }
}

fn scan(dir: &Path, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to read directory entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                continue;
            }
        }

        if path.join(MANIFEST_FILE).exists() {
            found.push(path.clone());
        }
        // Sub-packages nest under their parent directory
        scan(&path, found)?;
    }
    Ok(())
}

impl PluginHost for PluginRegistry {
    fn lookup(&self, name: &str) -> Option<PluginInfo> {
        let plugins = self.read().ok()?;
        plugins.get(name).map(|plugin| {
            let manifest = plugin.manifest();
            PluginInfo {
                name: manifest.name.clone(),
                version: manifest.version.clone(),
            }
        })
    }

    fn loaded(&self) -> Vec<String> {
        self.read()
            .map(|plugins| plugins.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn load(&self, name: &str) -> Result<(), PluginError> {
        validate_name(name)?;
        if self.read()?.contains_key(name) {
            return Err(PluginError::AlreadyLoaded(name.to_string()));
        }

        let dir = plugin_dir(&self.root, name);
        let plugin = loader::load_plugin(&dir)?;
        if plugin.manifest().name != name {
            return Err(PluginError::Load(format!(
                "Manifest in {} names {}, expected {}",
                dir.display(),
                plugin.manifest().name,
                name
            )));
        }

        self.write()?.insert(name.to_string(), plugin);
        Ok(())
    }

    fn unload(&self, name: &str) -> Result<(), PluginError> {
        let Some(plugin) = self.write()?.remove(name) else {
            return Err(PluginError::NotFound(name.to_string()));
        };

        if let Err(e) = plugin.plugin().shutdown() {
            warn!("Plugin {} shutdown failed: {}", name, e);
        }
        drop(plugin);
        info!("Unloaded plugin: {}", name);
        Ok(())
    }
}

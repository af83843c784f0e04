//! Plugin loader - Loads plugin units from shared libraries

use std::path::Path;
use std::sync::Arc;

use libloading::{Library, Symbol};
use tracing::info;

use crate::application::errors::{PluginError, PluginResult};

use super::manifest::{PluginManifest, MANIFEST_FILE};

/// Function signature for plugin initialization
pub type PluginInitFn = extern "C" fn() -> *mut dyn Plugin;

/// Symbol every plugin library must export
pub const INIT_SYMBOL: &[u8] = b"lantern_plugin_init";

/// Implemented by every dynamically loaded plugin unit
pub trait Plugin: Send + Sync {
    /// Called once right after the library is loaded
    fn init(&self) -> PluginResult<()>;

    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Called before the library is released
    fn shutdown(&self) -> PluginResult<()>;
}

/// A plugin unit together with the library that backs it
///
/// The library handle must outlive the instance; dropping this value
/// releases both, instance first.
pub struct LoadedPlugin {
    instance: Arc<dyn Plugin>,
    manifest: PluginManifest,
    #[allow(dead_code)]
    library: Library,
}

impl std::fmt::Debug for LoadedPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedPlugin")
            .field("name", &self.instance.name())
            .field("version", &self.instance.version())
            .field("manifest", &self.manifest)
            .finish()
    }
}

impl LoadedPlugin {
    pub fn plugin(&self) -> &dyn Plugin {
        self.instance.as_ref()
    }

    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }
}

/// Load a single plugin from its directory
pub fn load_plugin(path: impl AsRef<Path>) -> Result<LoadedPlugin, PluginError> {
    let path = path.as_ref();

    let manifest_path = path.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        return Err(PluginError::Load(format!(
            "Missing {} in {}",
            MANIFEST_FILE,
            path.display()
        )));
    }

    let manifest = PluginManifest::from_file(&manifest_path)?;

    let library_path = if let Some(lib) = &manifest.library {
        path.join(lib)
    } else {
        // Default: liblantern_<last namespace segment>.so
        let unit = manifest.name.rsplit('.').next().unwrap_or(&manifest.name);
        path.join(format!("liblantern_{}.so", unit))
    };

    if !library_path.exists() {
        return Err(PluginError::Load(format!(
            "Library not found: {}",
            library_path.display()
        )));
    }

    let library = unsafe {
        Library::new(&library_path)
            .map_err(|e| PluginError::Load(format!("Failed to load library: {}", e)))?
    };

    let init_fn: Symbol<PluginInitFn> = unsafe {
        library
            .get(INIT_SYMBOL)
            .map_err(|e| PluginError::Load(format!("Failed to find init symbol: {}", e)))?
    };

    let plugin_ptr = init_fn();
    if plugin_ptr.is_null() {
        return Err(PluginError::Load("Plugin init returned null".to_string()));
    }
    let instance: Arc<dyn Plugin> = unsafe { Arc::from(Box::from_raw(plugin_ptr)) };

    instance
        .init()
        .map_err(|e| PluginError::Load(format!("Plugin init failed: {}", e)))?;

    info!(
        "Loaded plugin: {} v{}",
        instance.name(),
        instance.version()
    );

    Ok(LoadedPlugin {
        instance,
        manifest,
        library,
    })
}

//! Plugin system
//!
//! Plugins are shared libraries living in per-name directories under the
//! configured plugins root, each described by a `plugin.yaml` manifest.
//! Namespaced names map to nested directories: `custom_pkg.greet` loads
//! from `<root>/custom_pkg/greet/`.

pub mod loader;
pub mod manifest;
pub mod registry;

pub use registry::PluginRegistry;

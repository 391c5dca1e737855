//! Built-in MCP resources: static documents a client reads by URI.

mod config_snapshot;
mod guidelines_doc;

pub use config_snapshot::ConfigSnapshotResource;
pub use guidelines_doc::GuidelinesResource;

use crate::config::{LoadedConfig, CONFIG_FILE};
use crate::registry::ResourceRegistry;

/// Registers every built-in resource.
pub fn register_builtin_resources(registry: &mut ResourceRegistry, loaded: &LoadedConfig) {
    registry.register(Box::new(GuidelinesResource::new(loaded.guidelines_file())));
    let config_path = loaded
        .config_path
        .clone()
        .unwrap_or_else(|| loaded.base_path.join(CONFIG_FILE));
    registry.register(Box::new(ConfigSnapshotResource::new(config_path)));
}

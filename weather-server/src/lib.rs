// weather-server/src/lib.rs
pub mod config;
pub mod message_handler;
pub mod plugin_registry;
pub mod plugins;
pub mod transport;

use crate::config::ServerConfig;
use crate::plugin_registry::PluginRegistry;
use std::sync::Arc;
use weather_common::PluginError;

/// Build the registry with every built-in plugin registered.
pub fn build_registry(config: &ServerConfig) -> Result<Arc<PluginRegistry>, PluginError> {
    let mut registry = PluginRegistry::new();
    plugins::register_all_plugins(&mut registry, config)?;
    Ok(Arc::new(registry))
}

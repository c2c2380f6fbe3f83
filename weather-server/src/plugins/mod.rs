// weather-server/src/plugins/mod.rs

pub mod resources;
pub mod weather;

use crate::config::ServerConfig;
use crate::plugin_registry::PluginRegistry;
use weather_common::PluginError;

/// Register every built-in tool and resource
pub fn register_all_plugins(
    registry: &mut PluginRegistry,
    config: &ServerConfig,
) -> Result<(), PluginError> {
    for tool in weather::create_plugins(&config.nws) {
        registry.register_tool(tool)?;
    }
    for resource in resources::create_plugins()? {
        registry.register_resource(resource)?;
    }
    Ok(())
}

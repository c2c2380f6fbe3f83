// weather-server/src/plugins/resources/mod.rs
mod plugin;

pub use plugin::{AppConfigResource, EchoResource, UserProfileResource};

use std::sync::Arc;
use weather_common::{McpResource, PluginError};

/// Create the built-in resources
pub fn create_plugins() -> Result<Vec<Arc<dyn McpResource>>, PluginError> {
    Ok(vec![
        Arc::new(AppConfigResource::new()?),
        Arc::new(UserProfileResource::new()?),
        Arc::new(EchoResource::new()?),
    ])
}

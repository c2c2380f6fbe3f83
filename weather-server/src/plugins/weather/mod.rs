// weather-server/src/plugins/weather/mod.rs
pub mod client;
pub mod format;
pub mod operations;
mod plugin;

pub use client::{AlertSource, FetchError, NwsClient};
pub use plugin::{CityAlertsTool, StateAlertsTool};

use crate::config::NwsConfig;
use std::sync::Arc;
use weather_common::McpTool;

/// Create the alert tools, both backed by one NWS fetcher
pub fn create_plugins(config: &NwsConfig) -> Vec<Arc<dyn McpTool>> {
    let base_url = config.base().to_string();
    let source: Arc<dyn AlertSource> = Arc::new(NwsClient::new(config.clone()));

    vec![
        Arc::new(StateAlertsTool::new(source.clone(), base_url.clone())),
        Arc::new(CityAlertsTool::new(source, base_url)),
    ]
}

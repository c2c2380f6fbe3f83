// weather-server/src/plugins/weather/plugin.rs
use crate::plugins::weather::client::AlertSource;
use crate::plugins::weather::operations;
use futures::future::BoxFuture;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use weather_common::{required_str, McpTool, PluginResult, ToolAnnotations};

fn read_only_annotations(title: &str) -> ToolAnnotations {
    ToolAnnotations {
        title: Some(title.to_string()),
        read_only_hint: Some(true),
        destructive_hint: Some(false),
        idempotent_hint: Some(true),
        open_world_hint: Some(true),
    }
}

/// `get_weather_alerts`: active alerts for a whole state.
pub struct StateAlertsTool {
    source: Arc<dyn AlertSource>,
    base_url: String,
}

impl StateAlertsTool {
    pub fn new(source: Arc<dyn AlertSource>, base_url: impl Into<String>) -> Self {
        StateAlertsTool { source, base_url: base_url.into() }
    }
}

impl McpTool for StateAlertsTool {
    fn name(&self) -> &str {
        "get_weather_alerts"
    }

    fn description(&self) -> &str {
        "Get current weather alerts from the NWS API for a specific US state"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "state": {
                    "type": "string",
                    "description": "Two-letter US state code (e.g. CA, TX, NY)"
                }
            },
            "required": ["state"]
        })
    }

    fn annotations(&self) -> Option<ToolAnnotations> {
        Some(read_only_annotations("State weather alerts"))
    }

    fn call<'a>(&'a self, arguments: &'a Value) -> BoxFuture<'a, PluginResult> {
        Box::pin(async move {
            let state = required_str(arguments, "state")?;
            info!("Fetching weather alerts for state: {}", state);

            let url = operations::state_alerts_url(&self.base_url, state);
            Ok(operations::query_alerts(self.source.as_ref(), &url).await?)
        })
    }
}

/// `fetch_city_weather`: active alerts narrowed to a city within a state.
pub struct CityAlertsTool {
    source: Arc<dyn AlertSource>,
    base_url: String,
}

impl CityAlertsTool {
    pub fn new(source: Arc<dyn AlertSource>, base_url: impl Into<String>) -> Self {
        CityAlertsTool { source, base_url: base_url.into() }
    }
}

impl McpTool for CityAlertsTool {
    fn name(&self) -> &str {
        "fetch_city_weather"
    }

    fn description(&self) -> &str {
        "Fetch current weather alerts for a city"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "City name"
                },
                "state": {
                    "type": "string",
                    "description": "Two-letter US state code"
                }
            },
            "required": ["city", "state"]
        })
    }

    fn annotations(&self) -> Option<ToolAnnotations> {
        Some(read_only_annotations("City weather alerts"))
    }

    fn call<'a>(&'a self, arguments: &'a Value) -> BoxFuture<'a, PluginResult> {
        Box::pin(async move {
            let city = required_str(arguments, "city")?;
            let state = required_str(arguments, "state")?;
            info!("Fetching weather alerts for {}, {}", city, state);

            let url = operations::city_alerts_url(&self.base_url, state, city);
            Ok(operations::query_alerts(self.source.as_ref(), &url).await?)
        })
    }
}

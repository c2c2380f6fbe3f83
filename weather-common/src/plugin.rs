// weather-common/src/plugin.rs
use crate::{ResourceTemplate, Resource, Tool, ToolAnnotations, UriTemplate};
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use std::error::Error;
use thiserror::Error;

/// Result type for plugin operations. Tools and resources answer with text.
pub type PluginResult = Result<String, Box<dyn Error + Send + Sync>>;

/// Errors raised by the plugin layer itself, as opposed to a tool's own failures.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),
    #[error("Tool '{0}' not found")]
    ToolNotFound(String),
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),
    #[error("Resource '{0}' is already registered")]
    DuplicateResource(String),
    #[error("Invalid URI template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },
}

/// A callable operation exposed through `tools/list` and `tools/call`.
pub trait McpTool: Send + Sync {
    /// Unique tool name
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema for the `arguments` object of `tools/call`
    fn input_schema(&self) -> Value;

    /// Annotations for the `tools/list` entry.
    fn annotations(&self) -> Option<ToolAnnotations> {
        None
    }

    /// Run the tool. Returned as a boxed future so the trait stays object-safe.
    fn call<'a>(&'a self, arguments: &'a Value) -> BoxFuture<'a, PluginResult>;

    fn to_tool(&self) -> Tool {
        Tool {
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            input_schema: self.input_schema(),
            annotations: self.annotations(),
        }
    }
}

/// A readable resource. Static resources have a template with no variables.
pub trait McpResource: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn template(&self) -> &UriTemplate;

    fn mime_type(&self) -> &str {
        "text/plain"
    }

    /// Render the resource for the variables captured from its URI.
    fn read(&self, params: &HashMap<String, String>) -> PluginResult;

    /// Listing entry for `resources/list`, `None` for templated resources.
    fn to_resource(&self) -> Option<Resource> {
        if !self.template().is_static() {
            return None;
        }
        Some(Resource {
            uri: self.template().as_str().to_string(),
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            mime_type: Some(self.mime_type().to_string()),
        })
    }

    /// Listing entry for `resources/templates/list`, `None` for static resources.
    fn to_resource_template(&self) -> Option<ResourceTemplate> {
        if self.template().is_static() {
            return None;
        }
        Some(ResourceTemplate {
            uri_template: self.template().as_str().to_string(),
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            mime_type: Some(self.mime_type().to_string()),
        })
    }
}

/// Fetch a required string argument from a `tools/call` arguments object.
pub fn required_str<'a>(arguments: &'a Value, key: &'static str) -> Result<&'a str, PluginError> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or(PluginError::MissingArgument(key))
}

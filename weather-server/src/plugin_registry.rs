// weather-server/src/plugin_registry.rs

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use weather_common::{McpResource, McpTool, PluginError, PluginResult};

/// Registry of every tool and resource the server exposes.
///
/// Built once during bootstrap, then shared read-only behind an `Arc`.
/// Listing order follows registration order.
#[derive(Default)]
pub struct PluginRegistry {
    tools: Vec<Arc<dyn McpTool>>,
    resources: Vec<Arc<dyn McpResource>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        PluginRegistry::default()
    }

    /// Register a tool with the registry
    pub fn register_tool(&mut self, tool: Arc<dyn McpTool>) -> Result<(), PluginError> {
        if self.get_tool(tool.name()).is_some() {
            return Err(PluginError::DuplicateTool(tool.name().to_string()));
        }
        info!("Registered tool: {}", tool.name());
        self.tools.push(tool);
        Ok(())
    }

    /// Register a resource with the registry
    pub fn register_resource(&mut self, resource: Arc<dyn McpResource>) -> Result<(), PluginError> {
        let template = resource.template().as_str();
        if self.resources.iter().any(|r| r.template().as_str() == template) {
            return Err(PluginError::DuplicateResource(template.to_string()));
        }
        info!("Registered resource: {}", template);
        self.resources.push(resource);
        Ok(())
    }

    /// Get a tool by name
    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn McpTool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn all_tools(&self) -> &[Arc<dyn McpTool>] {
        &self.tools
    }

    pub fn all_resources(&self) -> &[Arc<dyn McpResource>] {
        &self.resources
    }

    /// Execute a tool call
    pub async fn call_tool(&self, name: &str, arguments: &Value) -> PluginResult {
        let tool = self
            .get_tool(name)
            .ok_or_else(|| PluginError::ToolNotFound(name.to_string()))?;
        tool.call(arguments).await
    }

    /// Read the first resource whose template matches `uri`
    pub fn read_resource(&self, uri: &str) -> PluginResult {
        for resource in &self.resources {
            if let Some(params) = resource.template().matches(uri) {
                debug!("Resource {} matched template {}", uri, resource.template().as_str());
                return resource.read(&params);
            }
        }
        Err(PluginError::ResourceNotFound(uri.to_string()).into())
    }

    /// Look up the MIME type a resource URI would be served with
    pub fn resource_mime_type(&self, uri: &str) -> Option<String> {
        self.resources
            .iter()
            .find(|r| r.template().matches(uri).is_some())
            .map(|r| r.mime_type().to_string())
    }

    pub fn len(&self) -> usize {
        self.tools.len() + self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

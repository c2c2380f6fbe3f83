// weather-server/src/message_handler.rs
use crate::plugin_registry::PluginRegistry;
use crate::transport::MessageHandler;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use weather_common::{
    negotiate_protocol_version, CallToolParams, CallToolResult, EmptyResult, Implementation,
    InitializeParams, InitializeResult, ListResourceTemplatesResult, ListResourcesResult,
    ListToolsResult, MCPError, MCPRequest, MCPResponse, PluginError, ReadResourceParams,
    ReadResourceResult, ResourcesCapability, ServerCapabilities, TextResourceContents,
    ToolsCapability, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, LATEST_PROTOCOL_VERSION,
    METHOD_NOT_FOUND, PARSE_ERROR, RESOURCE_NOT_FOUND,
};

const INSTRUCTIONS: &str = "Weather alert server backed by the National Weather Service. \
    Use get_weather_alerts with a two-letter US state code, \
    or fetch_city_weather with a city and state.";

/// Dispatches MCP JSON-RPC messages to the plugin registry.
pub struct McpMessageHandler {
    registry: Arc<PluginRegistry>,
    server_info: Implementation,
}

impl McpMessageHandler {
    pub fn new(registry: Arc<PluginRegistry>, server_name: impl Into<String>) -> Self {
        Self {
            registry,
            server_info: Implementation {
                name: server_name.into(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Process a raw message, which may be a single request or a batch.
    pub async fn process_message(&self, message: &str) -> Option<String> {
        let value: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                error!("Parse error: {}", e);
                return Some(encode(&MCPResponse::failure(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                )));
            }
        };

        match value {
            Value::Array(items) if items.is_empty() => Some(encode(&MCPResponse::failure(
                Value::Null,
                INVALID_REQUEST,
                "Empty batch",
            ))),
            Value::Array(items) => {
                let mut responses = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(response) = self.process_value(item).await {
                        responses.push(response);
                    }
                }
                // A batch of notifications gets no reply at all
                if responses.is_empty() {
                    None
                } else {
                    Some(encode(&responses))
                }
            }
            single => self.process_value(single).await.map(|r| encode(&r)),
        }
    }

    async fn process_value(&self, value: Value) -> Option<MCPResponse> {
        let request: MCPRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                warn!("Invalid request: {}", e);
                return Some(MCPResponse::failure(
                    Value::Null,
                    INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                ));
            }
        };

        let id = request.id.clone().unwrap_or(Value::Null);
        if request.jsonrpc != "2.0" {
            warn!("Unsupported jsonrpc version: {}", request.jsonrpc);
            return Some(MCPResponse::failure(id, INVALID_REQUEST, "jsonrpc must be \"2.0\""));
        }

        if request.is_notification() {
            debug!("Notification received: {}", request.method);
            return None;
        }

        let span = info_span!("process_mcp_req", id = %id, method = %request.method);
        let response = async move {
            info!("Processing");
            match self.dispatch(&request).await {
                Ok(result) => MCPResponse::success(id, result),
                Err(e) => MCPResponse::from_error(id, e),
            }
        }
        .instrument(span)
        .await;
        Some(response)
    }

    async fn dispatch(&self, request: &MCPRequest) -> Result<Value, MCPError> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "ping" => to_value(&EmptyResult::default()),
            "tools/list" => self.handle_list_tools(),
            "tools/call" => self.handle_call_tool(request).await,
            "resources/list" => self.handle_list_resources(),
            "resources/templates/list" => self.handle_list_resource_templates(),
            "resources/read" => self.handle_read_resource(request),
            other => {
                warn!("Method not found: {}", other);
                Err(rpc_error(METHOD_NOT_FOUND, format!("Method not found: {}", other)))
            }
        }
    }

    // --- MCP Request Handler Implementations ---

    fn handle_initialize(&self, request: &MCPRequest) -> Result<Value, MCPError> {
        let requested = match &request.params {
            Some(params) => {
                let params: InitializeParams = parse_params(params.clone())?;
                if let Some(client) = &params.client_info {
                    info!("Client connected: {} {}", client.name, client.version);
                }
                params.protocol_version
            }
            None => LATEST_PROTOCOL_VERSION.to_string(),
        };

        let result = InitializeResult {
            protocol_version: negotiate_protocol_version(&requested).to_string(),
            capabilities: ServerCapabilities {
                resources: Some(ResourcesCapability { subscribe: false, list_changed: false }),
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: self.server_info.clone(),
            instructions: Some(INSTRUCTIONS.to_string()),
        };
        to_value(&result)
    }

    fn handle_list_tools(&self) -> Result<Value, MCPError> {
        let tools = self.registry.all_tools().iter().map(|t| t.to_tool()).collect();
        to_value(&ListToolsResult { tools, next_cursor: None })
    }

    async fn handle_call_tool(&self, request: &MCPRequest) -> Result<Value, MCPError> {
        let params: CallToolParams = parse_params(request.params.clone().unwrap_or(Value::Null))?;
        if self.registry.get_tool(&params.name).is_none() {
            warn!("Unknown tool: {}", params.name);
            return Err(rpc_error(INVALID_PARAMS, format!("Unknown tool: {}", params.name)));
        }

        let arguments = params.arguments.unwrap_or_else(|| json!({}));
        let result = match self.registry.call_tool(&params.name, &arguments).await {
            Ok(text) => CallToolResult::text(text),
            // The JSON-RPC call succeeded; the tool itself failed
            Err(e) => {
                warn!("Tool {} failed: {}", params.name, e);
                CallToolResult::error(format!("Error executing tool {}: {}", params.name, e))
            }
        };
        to_value(&result)
    }

    fn handle_list_resources(&self) -> Result<Value, MCPError> {
        let resources = self
            .registry
            .all_resources()
            .iter()
            .filter_map(|r| r.to_resource())
            .collect();
        to_value(&ListResourcesResult { resources, next_cursor: None })
    }

    fn handle_list_resource_templates(&self) -> Result<Value, MCPError> {
        let resource_templates = self
            .registry
            .all_resources()
            .iter()
            .filter_map(|r| r.to_resource_template())
            .collect();
        to_value(&ListResourceTemplatesResult { resource_templates, next_cursor: None })
    }

    fn handle_read_resource(&self, request: &MCPRequest) -> Result<Value, MCPError> {
        let params: ReadResourceParams =
            parse_params(request.params.clone().unwrap_or(Value::Null))?;

        let text = self.registry.read_resource(&params.uri).map_err(|e| {
            warn!("Read err: {}", e);
            match e.downcast_ref::<PluginError>() {
                Some(PluginError::ResourceNotFound(_)) => {
                    rpc_error(RESOURCE_NOT_FOUND, e.to_string())
                }
                _ => rpc_error(INTERNAL_ERROR, e.to_string()),
            }
        })?;

        let mime_type = self.registry.resource_mime_type(&params.uri);
        to_value(&ReadResourceResult {
            contents: vec![TextResourceContents { uri: params.uri, mime_type, text }],
        })
    }
}

impl MessageHandler for McpMessageHandler {
    fn handle_message<'a>(&'a self, message: String, client_id: String)
        -> BoxFuture<'a, Option<String>> {
        Box::pin(async move {
            debug!("Processing message from client {}", client_id);
            self.process_message(&message).await
        })
    }
}

// --- Utility Functions ---

fn rpc_error(code: i32, message: impl Into<String>) -> MCPError {
    MCPError { code, message: message.into(), data: None }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, MCPError> {
    serde_json::from_value(params)
        .map_err(|e| rpc_error(INVALID_PARAMS, format!("Invalid params: {}", e)))
}

fn to_value<T: Serialize>(result: &T) -> Result<Value, MCPError> {
    serde_json::to_value(result).map_err(|e| rpc_error(INTERNAL_ERROR, e.to_string()))
}

fn encode<T: Serialize>(response: &T) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        error!("Failed to serialize response: {}", e);
        let error = json!({"code": INTERNAL_ERROR, "message": e.to_string()});
        json!({"jsonrpc": "2.0", "id": null, "error": error}).to_string()
    })
}

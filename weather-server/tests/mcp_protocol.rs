use httpmock::prelude::*;
use serde_json::{json, Value};

use weather_server::build_registry;
use weather_server::config::{NwsConfig, ServerConfig};
use weather_server::message_handler::McpMessageHandler;

fn handler_for(base_url: String) -> McpMessageHandler {
    let config = ServerConfig {
        nws: NwsConfig { base_url, ..NwsConfig::default() },
        ..ServerConfig::default()
    };
    let registry = build_registry(&config).expect("registry");
    McpMessageHandler::new(registry, config.server.name)
}

async fn request(handler: &McpMessageHandler, body: Value) -> Value {
    let raw = handler
        .process_message(&body.to_string())
        .await
        .expect("response expected");
    serde_json::from_str(&raw).expect("response is json")
}

async fn call_tool(handler: &McpMessageHandler, name: &str, arguments: Value) -> Value {
    request(
        handler,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": name, "arguments": arguments}
        }),
    )
    .await
}

fn text_of(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().expect("text content")
}

#[tokio::test]
async fn initialize_reports_server_and_capabilities() {
    let handler = handler_for("http://unused.test".into());
    let response = request(
        &handler,
        json!({
            "jsonrpc": "2.0",
            "id": "init-1",
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "test-client", "version": "0.0.1"}
            }
        }),
    )
    .await;

    assert_eq!(response["id"], "init-1");
    let result = &response["result"];
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], "weather");
    assert!(result["capabilities"]["tools"].is_object());
    assert!(result["capabilities"]["resources"].is_object());
}

#[tokio::test]
async fn lists_tools_in_registration_order() {
    let handler = handler_for("http://unused.test".into());
    let response =
        request(&handler, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;

    let names: Vec<&str> = response["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["get_weather_alerts", "fetch_city_weather"]);
    assert_eq!(response["result"]["tools"][0]["inputSchema"]["required"], json!(["state"]));
    assert_eq!(response["result"]["tools"][0]["annotations"]["readOnlyHint"], true);
}

#[tokio::test]
async fn state_alerts_are_formatted_and_joined() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/alerts/active/area/CA");
            then.status(200).json_body(json!({
                "features": [
                    {"properties": {"event": "Tornado Warning"}},
                    {"properties": {
                        "event": "Flood Watch",
                        "areaDesc": "Fresno",
                        "severity": "Moderate",
                        "description": "Rain.",
                        "instruction": "Stay alert."
                    }}
                ]
            }));
        })
        .await;

    let handler = handler_for(server.base_url());
    let response = call_tool(&handler, "get_weather_alerts", json!({"state": "CA"})).await;

    assert_eq!(response["result"]["isError"], false);
    assert_eq!(
        text_of(&response),
        "Event: Tornado Warning\nArea: N/A\nSeverity: N/A\n\
         Description: No additional information\nInstructions: No additional information\n\
         Event: Flood Watch\nArea: Fresno\nSeverity: Moderate\n\
         Description: Rain.\nInstructions: Stay alert."
    );
}

#[tokio::test]
async fn unknown_area_yields_no_data_sentinel() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/alerts/active/area/ZZ");
            then.status(400).json_body(json!({"title": "Bad Request"}));
        })
        .await;

    let handler = handler_for(server.base_url());
    let response = call_tool(&handler, "get_weather_alerts", json!({"state": "ZZ"})).await;

    assert_eq!(response["result"]["isError"], false);
    assert_eq!(text_of(&response), "No data or weather alerts found");
}

#[tokio::test]
async fn city_lookup_hits_state_then_city_path() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/alerts/active/area/TX/Austin");
            then.status(200).json_body(json!({"features": []}));
        })
        .await;

    let handler = handler_for(server.base_url());
    let response =
        call_tool(&handler, "fetch_city_weather", json!({"city": "Austin", "state": "TX"})).await;

    assert_eq!(text_of(&response), "No active weather alerts found ");
    mock.assert_async().await;
}

#[tokio::test]
async fn transport_failures_surface_as_tool_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let handler = handler_for(server.base_url());
    let response = call_tool(&handler, "get_weather_alerts", json!({"state": "CA"})).await;

    assert_eq!(response["result"]["isError"], true);
    assert!(text_of(&response)
        .starts_with("Error executing tool get_weather_alerts: invalid JSON"));
}

#[tokio::test]
async fn missing_arguments_are_tool_errors() {
    let handler = handler_for("http://unused.test".into());
    let response = call_tool(&handler, "fetch_city_weather", json!({"city": "Austin"})).await;

    assert_eq!(response["result"]["isError"], true);
    assert!(text_of(&response).contains("Missing required argument: state"));
}

#[tokio::test]
async fn unknown_tool_is_invalid_params() {
    let handler = handler_for("http://unused.test".into());
    let response = call_tool(&handler, "get_forecast", json!({})).await;
    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn resources_are_listed_and_read() {
    let handler = handler_for("http://unused.test".into());

    let listed =
        request(&handler, json!({"jsonrpc": "2.0", "id": 1, "method": "resources/list"})).await;
    assert_eq!(listed["result"]["resources"], json!([{
        "uri": "config://app",
        "name": "app_config",
        "description": "Static configuration data",
        "mimeType": "text/plain"
    }]));

    let templates = request(
        &handler,
        json!({"jsonrpc": "2.0", "id": 2, "method": "resources/templates/list"}),
    )
    .await;
    let uris: Vec<&str> = templates["result"]["resourceTemplates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["uriTemplate"].as_str().unwrap())
        .collect();
    assert_eq!(uris, ["users://{user_id}/profile", "echo://{message}"]);

    for (uri, expected) in [
        ("config://app", "App configuration here"),
        ("users://7/profile", "Profile data for user 7"),
        ("echo://hello", "Resource echo: hello"),
    ] {
        let read = request(
            &handler,
            json!({"jsonrpc": "2.0", "id": 3, "method": "resources/read", "params": {"uri": uri}}),
        )
        .await;
        assert_eq!(read["result"]["contents"][0]["uri"], uri);
        assert_eq!(read["result"]["contents"][0]["text"], expected);
        assert_eq!(read["result"]["contents"][0]["mimeType"], "text/plain");
    }
}

#[tokio::test]
async fn unknown_resource_is_not_found() {
    let handler = handler_for("http://unused.test".into());
    let response = request(
        &handler,
        json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "resources/read",
            "params": {"uri": "files://x"}
        }),
    )
    .await;
    assert_eq!(response["error"]["code"], -32002);
}

#[tokio::test]
async fn protocol_errors() {
    let handler = handler_for("http://unused.test".into());

    let raw = handler.process_message("{oops").await.unwrap();
    let parsed: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed["error"]["code"], -32700);
    assert_eq!(parsed["id"], Value::Null);

    let response =
        request(&handler, json!({"jsonrpc": "2.0", "id": 9, "method": "prompts/list"})).await;
    assert_eq!(response["error"]["code"], -32601);
    assert_eq!(response["id"], 9);

    let response = request(&handler, json!({"jsonrpc": "1.0", "id": 10, "method": "ping"})).await;
    assert_eq!(response["error"]["code"], -32600);

    let response = request(
        &handler,
        json!({"jsonrpc": "2.0", "id": 11, "method": "resources/read", "params": {}}),
    )
    .await;
    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn notifications_and_batches() {
    let handler = handler_for("http://unused.test".into());

    let note = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
    let none = handler.process_message(&note.to_string()).await;
    assert!(none.is_none());

    let response =
        request(&handler, json!({"jsonrpc": "2.0", "id": null, "method": "ping"})).await;
    assert_eq!(response["id"], Value::Null);
    assert_eq!(response["result"], json!({}));

    let batch = json!([
        {"jsonrpc": "2.0", "id": 1, "method": "ping"},
        {"jsonrpc": "2.0", "method": "notifications/initialized"},
        {"jsonrpc": "2.0", "id": 2, "method": "ping"}
    ]);
    let raw = handler.process_message(&batch.to_string()).await.unwrap();
    let responses: Vec<Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[1]["result"], json!({}));
}

//! MCP protocol integration tests.
//!
//! These tests spawn the actual `astro-bridge mcp` process and communicate via
//! JSON-RPC over stdio, testing the complete MCP protocol flow.
//!
//! The rmcp library uses line-delimited JSON (each message is one line):
//! ```
//! {"jsonrpc":"2.0","id":1,"method":"initialize",...}\n
//! {"jsonrpc":"2.0","id":1,"result":{...}}\n
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};

/// JSON-RPC 2.0 request
#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct JsonRpcError {
    code: i64,
    message: String,
    data: Option<Value>,
}

/// MCP test client that spawns and communicates with the server
struct McpTestClient {
    child: Child,
    request_id: u64,
    reader: BufReader<std::process::ChildStdout>,
}

impl McpTestClient {
    /// Spawn a new MCP server process pointed at a calculation API that is not running
    fn spawn() -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_astro-bridge"))
            .arg("mcp")
            .env("ASTRO_API_URL", "http://127.0.0.1:9")
            .env("ASTRO_API_TIMEOUT_SECS", "2")
            .env_remove("ASTRO_API_KEY")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn astro-bridge mcp");

        let stdout = child.stdout.take().expect("Failed to get stdout");
        let reader = BufReader::new(stdout);

        Self {
            child,
            request_id: 0,
            reader,
        }
    }

    /// Send a message as line-delimited JSON
    fn send_message(&mut self, content: &str) {
        let stdin = self.child.stdin.as_mut().expect("Failed to get stdin");
        writeln!(stdin, "{}", content).expect("Failed to write message");
        stdin.flush().expect("Failed to flush stdin");
    }

    /// Read a message as line-delimited JSON
    fn read_message(&mut self) -> String {
        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .expect("Failed to read line");
        line.trim().to_string()
    }

    /// Send a JSON-RPC request and get the response
    fn request(&mut self, method: &str, params: Option<Value>) -> JsonRpcResponse {
        self.request_id += 1;
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.request_id,
            method: method.to_string(),
            params,
        };

        let request_json = serde_json::to_string(&request).expect("Failed to serialize request");
        self.send_message(&request_json);

        let response_json = self.read_message();
        serde_json::from_str(&response_json).expect("Failed to parse response")
    }

    /// Send initialize request and initialized notification (required first messages)
    fn initialize(&mut self) -> JsonRpcResponse {
        let response = self.request(
            "initialize",
            Some(json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {
                    "name": "test-client",
                    "version": "1.0.0"
                }
            })),
        );

        // Send initialized notification (required by MCP protocol)
        let notification = json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        });
        self.send_message(&notification.to_string());

        response
    }

    fn list_tools(&mut self) -> JsonRpcResponse {
        self.request("tools/list", None)
    }

    fn call_tool(&mut self, name: &str, arguments: Value) -> JsonRpcResponse {
        self.request(
            "tools/call",
            Some(json!({
                "name": name,
                "arguments": arguments
            })),
        )
    }
}

impl Drop for McpTestClient {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn extract_text_content(response: &JsonRpcResponse) -> String {
    response
        .result
        .as_ref()
        .and_then(|r| r.get("content"))
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|c| c.get("text"))
        .and_then(|t| t.as_str())
        .expect("Expected text content in response")
        .to_string()
}

fn resolved_chart(name: &str, planets: Value) -> Value {
    json!({
        "name": name,
        "year": 1990,
        "month": 4,
        "day": 15,
        "hour": 8,
        "minute": 30,
        "latitude": -23.5505,
        "longitude": -46.6333,
        "planets": planets
    })
}

fn birth_data(name: &str) -> Value {
    json!({
        "name": name,
        "year": 1990,
        "month": 4,
        "day": 15,
        "hour": 8,
        "minute": 30,
        "latitude": -23.5505,
        "longitude": -46.6333,
        "tz_str": "America/Sao_Paulo"
    })
}

// ============================================================
// Protocol Tests
// ============================================================

mod protocol {
    use super::*;

    #[test]
    fn initialize_returns_server_info() {
        let mut client = McpTestClient::spawn();
        let response = client.initialize();

        assert!(response.error.is_none(), "Expected success, got error");
        let result = response.result.expect("Expected result");

        assert_eq!(
            result["serverInfo"]["name"].as_str(),
            Some("astro-bridge")
        );
        assert!(result.get("capabilities").is_some());
        assert!(result["instructions"]
            .as_str()
            .is_some_and(|s| s.contains("Aries")));
    }

    #[test]
    fn tools_list_returns_all_tools() {
        let mut client = McpTestClient::spawn();
        client.initialize();

        let response = client.list_tools();
        assert!(response.error.is_none(), "Expected success, got error");

        let result = response.result.expect("Expected result");
        let tools = result
            .get("tools")
            .and_then(|t| t.as_array())
            .expect("Expected tools array");

        let mut tool_names: Vec<&str> = tools
            .iter()
            .filter_map(|t| t.get("name").and_then(|n| n.as_str()))
            .collect();
        tool_names.sort_unstable();

        assert_eq!(
            tool_names,
            vec![
                "calculate_natal_chart",
                "calculate_transits_to_natal",
                "find_transit_aspects",
                "generate_combined_svg_chart",
                "generate_svg_chart",
                "get_current_transits",
                "render_combined_chart_from_positions",
            ]
        );

        for tool in tools {
            assert!(tool.get("description").is_some());
            assert!(tool.get("inputSchema").is_some());
        }
    }
}

// ============================================================
// Tool Call Tests
// ============================================================

mod tool_calls {
    use super::*;

    #[test]
    fn render_from_positions_returns_svg() {
        let mut client = McpTestClient::spawn();
        client.initialize();

        let response = client.call_tool(
            "render_combined_chart_from_positions",
            json!({
                "natal": resolved_chart("Ana", json!([
                    { "planet": "sun", "longitude": 202.0, "sign": "libra" },
                    { "planet": "moon", "longitude": 10.0, "sign": "aries" }
                ])),
                "transit": resolved_chart("Now", json!([
                    { "planet": "mars", "longitude": 22.0, "sign": "aries" }
                ]))
            }),
        );

        assert!(response.error.is_none(), "Expected success, got {:?}", response.error);
        let svg = extract_text_content(&response);
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("Ana - Natal Chart with Transits of Now"));
        assert!(svg.contains(r##"stroke="#0000FF""##));
    }

    #[test]
    fn render_from_positions_can_return_base64() {
        let mut client = McpTestClient::spawn();
        client.initialize();

        let response = client.call_tool(
            "render_combined_chart_from_positions",
            json!({
                "natal": resolved_chart("Ana", json!([
                    { "planet": "sun", "longitude": 202.0, "sign": "libra" }
                ])),
                "transit": resolved_chart("Now", json!([
                    { "planet": "mars", "longitude": 22.0, "sign": "aries" }
                ])),
                "theme": "dark",
                "return_base64": true
            }),
        );

        let text = extract_text_content(&response);
        let encoded: Value = serde_json::from_str(&text).expect("Expected JSON in text");
        assert!(encoded["svg_base64"].as_str().is_some());
        assert!(encoded["data_uri"]
            .as_str()
            .is_some_and(|uri| uri.starts_with("data:image/svg+xml;base64,")));
    }

    #[test]
    fn render_from_positions_rejects_empty_chart() {
        let mut client = McpTestClient::spawn();
        client.initialize();

        let response = client.call_tool(
            "render_combined_chart_from_positions",
            json!({
                "natal": resolved_chart("Ana", json!([])),
                "transit": resolved_chart("Now", json!([
                    { "planet": "mars", "longitude": 22.0, "sign": "aries" }
                ]))
            }),
        );

        let error = response.error.expect("Expected error");
        assert!(error.message.contains("Ana"));
    }

    #[test]
    fn generate_reports_unreachable_calculation_api() {
        let mut client = McpTestClient::spawn();
        client.initialize();

        let response = client.call_tool(
            "generate_combined_svg_chart",
            json!({
                "natal_chart": birth_data("Ana"),
                "transit_chart": birth_data("Now")
            }),
        );

        assert!(response.error.is_some(), "Expected error, got {:?}", response.result);
    }
}

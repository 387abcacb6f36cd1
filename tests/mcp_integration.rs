//! Testes de integração para o protocolo MCP do hotjar-mcp.

use serde_json::{json, Value};

/// Helper para criar uma mensagem JSON-RPC.
fn jsonrpc_request(id: u64, method: &str, params: Option<Value>) -> String {
    let mut req = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
    });
    if let Some(p) = params {
        req["params"] = p;
    }
    serde_json::to_string(&req).unwrap()
}

#[test]
fn test_jsonrpc_request_format() {
    let req = jsonrpc_request(1, "initialize", None);
    let parsed: Value = serde_json::from_str(&req).unwrap();

    assert_eq!(parsed["jsonrpc"], "2.0");
    assert_eq!(parsed["id"], 1);
    assert_eq!(parsed["method"], "initialize");
}

#[test]
fn test_jsonrpc_with_params() {
    let params = json!({
        "name": "getHotjarSurveys",
        "arguments": {"siteId": "S1"}
    });
    let req = jsonrpc_request(42, "tools/call", Some(params.clone()));
    let parsed: Value = serde_json::from_str(&req).unwrap();

    assert_eq!(parsed["id"], 42);
    assert_eq!(parsed["method"], "tools/call");
    assert_eq!(parsed["params"]["name"], "getHotjarSurveys");
    assert_eq!(parsed["params"]["arguments"]["siteId"], "S1");
}

// Testes do protocolo MCP
mod protocol_tests {
    use hotjar_mcp::mcp::{
        JsonRpcError, JsonRpcId, JsonRpcRequest, JsonRpcResponse, ToolDescription, ToolResult,
        INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
    };
    use serde_json::json;

    #[test]
    fn test_json_rpc_id_roundtrip() {
        let number = JsonRpcId::Number(42);
        assert_eq!(serde_json::to_string(&number).unwrap(), "42");

        let string = JsonRpcId::String("req-1".to_string());
        assert_eq!(serde_json::to_string(&string).unwrap(), "\"req-1\"");

        let parsed: JsonRpcId = serde_json::from_str("42").unwrap();
        assert!(matches!(parsed, JsonRpcId::Number(42)));
    }

    #[test]
    fn test_json_rpc_request_parsing() {
        let json_str = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#;
        let request: JsonRpcRequest = serde_json::from_str(json_str).unwrap();

        assert_eq!(request.jsonrpc, "2.0");
        assert!(matches!(request.id, Some(JsonRpcId::Number(1))));
        assert_eq!(request.method, "initialize");
    }

    #[test]
    fn test_json_rpc_response_success() {
        let response =
            JsonRpcResponse::success(Some(JsonRpcId::Number(1)), json!({"status": "ok"}));

        assert_eq!(response.jsonrpc, "2.0");
        assert!(response.error.is_none());
        assert!(response.result.is_some());
    }

    #[test]
    fn test_json_rpc_response_error() {
        let response = JsonRpcResponse::error(
            Some(JsonRpcId::Number(1)),
            JsonRpcError::method_not_found("unknown_method"),
        );

        assert!(response.error.is_some());
        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[test]
    fn test_tool_description_schema() {
        let tool = ToolDescription::new(
            "getHotjarSurveys",
            "Get surveys for a specific Hotjar site",
            json!({
                "type": "object",
                "properties": {
                    "siteId": { "type": "string" }
                },
                "required": []
            }),
        );

        assert_eq!(tool.name, "getHotjarSurveys");
        assert!(tool.input_schema["properties"]["siteId"]["type"] == "string");
    }

    #[test]
    fn test_tool_result_variants() {
        let ok = ToolResult::success("Hotjar Surveys for Site S1");
        assert!(!ok.is_error);
        assert_eq!(ok.content.len(), 1);

        let err = ToolResult::error("Authentication Error: No access token received");
        assert!(err.is_error);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(PARSE_ERROR, -32700);
        assert_eq!(INVALID_REQUEST, -32600);
        assert_eq!(METHOD_NOT_FOUND, -32601);
        assert_eq!(INVALID_PARAMS, -32602);
        assert_eq!(INTERNAL_ERROR, -32603);
    }
}

// Testes do núcleo do servidor, direto no dispatch JSON-RPC
mod server_tests {
    use hotjar_mcp::mcp::{JsonRpcRequest, McpServer};
    use hotjar_mcp::Config;
    use serde_json::json;

    fn request(method: &str, params: serde_json::Value) -> JsonRpcRequest {
        JsonRpcRequest::new(method, Some(1.into())).with_params(params)
    }

    #[tokio::test]
    async fn test_initialize_handshake() {
        let server = McpServer::new(Config::default());

        let response = server.handle_request(request("initialize", json!({}))).await;

        assert!(!response.is_error());
        let result = response.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "hotjar-mcp-server");
        assert_eq!(result["protocolVersion"], "2024-11-05");
    }

    #[tokio::test]
    async fn test_tools_list_exposes_the_three_survey_tools() {
        let server = McpServer::new(Config::default());

        let response = server.handle_request(request("tools/list", json!({}))).await;
        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();

        let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            vec![
                "getHotjarSurveys",
                "getHotjarSurveyDetails",
                "getHotjarSurveyResponses"
            ]
        );

        // todo tool expõe um JSON Schema de objeto
        for tool in &tools {
            assert_eq!(tool["inputSchema"]["type"], "object");
        }
    }

    #[tokio::test]
    async fn test_tool_errors_stay_inside_tool_result() {
        let server = McpServer::new(Config::default());

        let response = server
            .handle_request(request(
                "tools/call",
                json!({"name": "getHotjarSurveys", "arguments": {}}),
            ))
            .await;

        // a falha vira payload de erro da ferramenta, não erro JSON-RPC
        assert!(!response.is_error());
        let result = response.result.unwrap();
        assert_eq!(result["isError"], json!(true));
    }

    #[tokio::test]
    async fn test_unknown_method_is_json_rpc_error() {
        let server = McpServer::new(Config::default());

        let response = server.handle_request(request("resources/list", json!({}))).await;
        assert!(response.is_error());
    }
}

// Testes do cache de tokens
mod cache_tests {
    use chrono::{Duration, Utc};
    use hotjar_mcp::cache::{CachedToken, TokenCache, TOKEN_EXPIRE_BUFFER_SECS};

    #[test]
    fn test_cache_hit_within_window() {
        let issued = Utc::now();
        let mut cache = TokenCache::new(8);

        cache.insert("client-1", CachedToken::new("tok-1", 3600, issued));

        let token = cache.get("client-1", issued + Duration::seconds(3000));
        assert_eq!(token.as_deref(), Some("tok-1"));
    }

    #[test]
    fn test_cache_expires_with_buffer() {
        let issued = Utc::now();
        let mut cache = TokenCache::new(8);

        cache.insert("client-1", CachedToken::new("tok-1", 3600, issued));

        // 3600 - 60 de margem: aos 3540s a entrada já expirou
        let expired_at = issued + Duration::seconds(3600 - TOKEN_EXPIRE_BUFFER_SECS);
        assert!(cache.get("client-1", expired_at).is_none());
    }

    #[test]
    fn test_cache_keys_are_independent() {
        let issued = Utc::now();
        let mut cache = TokenCache::new(8);

        cache.insert("client-a", CachedToken::new("tok-a", 3600, issued));

        assert!(cache.get("client-b", issued).is_none());
        assert_eq!(cache.get("client-a", issued).as_deref(), Some("tok-a"));
    }

    #[test]
    fn test_refresh_overwrites_entry() {
        let issued = Utc::now();
        let mut cache = TokenCache::new(8);

        cache.insert("client-1", CachedToken::new("old", 3600, issued));
        cache.insert(
            "client-1",
            CachedToken::new("new", 3600, issued + Duration::seconds(10)),
        );

        assert_eq!(cache.get("client-1", issued).as_deref(), Some("new"));
        assert_eq!(cache.stats().size, 1);
    }

    #[test]
    fn test_stats_track_hits_and_misses() {
        let issued = Utc::now();
        let mut cache = TokenCache::new(8);
        cache.insert("client-1", CachedToken::new("tok", 3600, issued));

        cache.get("client-1", issued); // hit
        cache.get("client-2", issued); // miss

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }
}

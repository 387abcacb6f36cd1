//! Servidor MCP do hotjar-mcp.
//!
//! Núcleo compartilhado pelos dois transportes: o loop stdio chama
//! [`McpServer::handle_request`] diretamente, e o transporte SSE despacha
//! para o mesmo núcleo a partir das sessões HTTP.

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::json;

use crate::types::config::Config;
use crate::ServerResult;

use super::protocol::{
    CallToolParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult,
};
use super::tools::ToolHandler;
use super::transport::StdioTransport;

/// Servidor MCP.
pub struct McpServer {
    tools: ToolHandler,
    // AtomicBool para que os handlers trabalhem com &self: o transporte SSE
    // compartilha um único núcleo entre todas as sessões.
    initialized: AtomicBool,
}

impl McpServer {
    /// Cria um novo servidor MCP.
    pub fn new(config: Config) -> Self {
        Self::with_tools(ToolHandler::new(config))
    }

    /// Cria um servidor com um handler pré-construído (testes).
    pub fn with_tools(tools: ToolHandler) -> Self {
        Self {
            tools,
            initialized: AtomicBool::new(false),
        }
    }

    /// Verifica se o handshake initialize já aconteceu.
    pub fn initialized(&self) -> bool {
        self.initialized.load(Ordering::Relaxed)
    }

    /// Loop principal do transporte stdio.
    ///
    /// Bloqueia processando mensagens até EOF.
    pub async fn run_stdio(&self) -> ServerResult<()> {
        tracing::info!("Hotjar MCP Server starting on stdio...");

        let mut transport = StdioTransport::new();

        loop {
            let request = match transport.read_message() {
                Ok(req) => req,
                Err(e) => {
                    // EOF ou erro de leitura - cliente desconectou
                    if e.to_string().contains("EOF") || e.to_string().contains("empty") {
                        tracing::info!("Client disconnected");
                        break;
                    }
                    tracing::error!(error = %e, "Failed to read message");
                    continue;
                }
            };

            // Notificações (sem ID) não recebem resposta segundo JSON-RPC 2.0
            let is_notification = request.is_notification();

            let response = self.handle_request(request).await;

            if !is_notification {
                if let Err(e) = transport.write_response(&response) {
                    tracing::error!(error = %e, "Failed to write response");
                }
            }
        }

        tracing::info!("Hotjar MCP Server stopped");
        Ok(())
    }

    /// Processa uma requisição JSON-RPC.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!(method = %request.method, "Handling request");

        match request.method.as_str() {
            // Lifecycle
            "initialize" => self.handle_initialize(request),
            "initialized" | "notifications/initialized" => self.handle_initialized(request),
            "shutdown" => self.handle_shutdown(request),

            // Tools
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,

            // Método desconhecido
            _ => {
                JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(&request.method))
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Handlers de lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::info!("Client initializing connection");

        self.initialized.store(true, Ordering::Relaxed);

        JsonRpcResponse::success(
            request.id,
            serde_json::to_value(InitializeResult::default()).unwrap_or(json!({})),
        )
    }

    fn handle_initialized(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::info!("Client initialization complete");

        // é uma notificação; a resposta vazia só sai se o cliente mandar ID
        JsonRpcResponse::success(request.id, json!({}))
    }

    fn handle_shutdown(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::info!("Client requested shutdown");

        self.initialized.store(false, Ordering::Relaxed);

        JsonRpcResponse::success(request.id, json!(null))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Handlers de tools
    // ═══════════════════════════════════════════════════════════════════════

    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let result = ListToolsResult {
            tools: ToolHandler::list_tools(),
        };

        JsonRpcResponse::success(
            request.id,
            serde_json::to_value(result).unwrap_or(json!({"tools": []})),
        )
    }

    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params: CallToolParams = match request.params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        request.id,
                        JsonRpcError::invalid_params(format!("Invalid params: {}", e)),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::invalid_params("Missing params"),
                );
            }
        };

        tracing::info!(tool = %params.name, "Calling tool");

        let result = self
            .tools
            .handle_tool_call(&params.name, params.arguments)
            .await;

        let result_value = serde_json::to_value(&result).unwrap_or_else(|_| {
            json!({
                "content": [{"type": "text", "text": "Internal error"}],
                "isError": true
            })
        });

        JsonRpcResponse::success(request.id, result_value)
    }
}

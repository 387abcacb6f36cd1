//! Servidor MCP do hotjar-mcp.
//!
//! Implementa o servidor MCP (Model Context Protocol) que expõe as
//! operações de survey da API Hotjar como ferramentas para agentes LLM.
//!
//! ## Ferramentas Expostas
//!
//! - `getHotjarSurveys` - lista surveys de um site
//! - `getHotjarSurveyDetails` - detalhes de uma survey
//! - `getHotjarSurveyResponses` - respostas de uma survey
//!
//! ## Transportes
//!
//! - stdio: newline-delimited JSON ([`McpServer::run_stdio`])
//! - SSE sobre HTTP ([`run_sse`]), com endpoint de health
//!
//! ## Exemplo de Uso
//!
//! ```ignore
//! use hotjar_mcp::mcp::McpServer;
//! use hotjar_mcp::Config;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load_or_default();
//!     let server = McpServer::new(config);
//!     server.run_stdio().await.unwrap();
//! }
//! ```

mod http;
mod protocol;
mod server;
mod tools;
mod transport;

pub use protocol::{
    CallToolParams, InitializeResult, JsonRpcError, JsonRpcId, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, ServerCapabilities, ServerInfo, ToolContent, ToolDescription, ToolResult,
    ToolsCapability, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
    PARSE_ERROR, SERVER_NAME,
};

pub use http::{router, run_sse, SseState};
pub use server::McpServer;
pub use tools::ToolHandler;
pub use transport::StdioTransport;

//! Transporte stdio para comunicação MCP.
//!
//! Mensagens em newline-delimited JSON, conforme a especificação MCP:
//! cada linha é um objeto JSON-RPC 2.0 completo, sem newlines embutidos.
//! stdout carrega exclusivamente o protocolo; logs vão para stderr.

use std::io::{BufRead, BufReader, BufWriter, Stdin, Stdout, Write};

use crate::types::errors::ServerError;
use crate::ServerResult;

use super::protocol::{JsonRpcRequest, JsonRpcResponse};

/// Transporte stdio para comunicação com o cliente MCP.
pub struct StdioTransport {
    reader: BufReader<Stdin>,
    writer: BufWriter<Stdout>,
}

impl StdioTransport {
    /// Cria um novo transporte stdio.
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(std::io::stdin()),
            writer: BufWriter::new(std::io::stdout()),
        }
    }

    /// Lê uma mensagem JSON-RPC de stdin.
    ///
    /// Bloqueia até receber uma linha completa. EOF (0 bytes) encerra o
    /// loop do servidor.
    pub fn read_message(&mut self) -> ServerResult<JsonRpcRequest> {
        let mut line = String::new();

        let bytes_read = self
            .reader
            .read_line(&mut line)
            .map_err(ServerError::Io)?;

        if bytes_read == 0 {
            return Err(ServerError::transport("EOF"));
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(ServerError::transport("Empty message received"));
        }

        let request: JsonRpcRequest = serde_json::from_str(trimmed).map_err(ServerError::Json)?;

        tracing::debug!(
            method = %request.method,
            id = ?request.id,
            "Received request"
        );

        Ok(request)
    }

    /// Escreve uma resposta JSON-RPC em stdout.
    ///
    /// Serialização compacta (uma linha) seguida de newline; flush imediato
    /// para a mensagem não ficar presa no buffer.
    pub fn write_response(&mut self, response: &JsonRpcResponse) -> ServerResult<()> {
        let body = serde_json::to_string(response).map_err(ServerError::Json)?;

        self.writer.write_all(body.as_bytes()).map_err(ServerError::Io)?;
        self.writer.write_all(b"\n").map_err(ServerError::Io)?;
        self.writer.flush().map_err(ServerError::Io)?;

        tracing::debug!(
            id = ?response.id,
            is_error = response.is_error(),
            "Sent response"
        );

        Ok(())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Transporte baseado em strings para testes, com o mesmo formato
/// newline-delimited JSON.
#[cfg(test)]
pub struct StringTransport {
    input: std::io::Cursor<Vec<u8>>,
    output: Vec<u8>,
}

#[cfg(test)]
impl StringTransport {
    /// Cria um transporte com input pré-definido.
    pub fn new(input: &str) -> Self {
        Self {
            input: std::io::Cursor::new(input.as_bytes().to_vec()),
            output: Vec::new(),
        }
    }

    /// Lê uma mensagem JSON-RPC.
    pub fn read_message(&mut self) -> ServerResult<JsonRpcRequest> {
        use std::io::BufRead;

        let mut line = String::new();
        let bytes_read = self.input.read_line(&mut line).map_err(ServerError::Io)?;

        if bytes_read == 0 {
            return Err(ServerError::transport("EOF"));
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(ServerError::transport("Empty message"));
        }

        serde_json::from_str(trimmed).map_err(ServerError::Json)
    }

    /// Escreve uma resposta.
    pub fn write_response(&mut self, response: &JsonRpcResponse) -> ServerResult<()> {
        let body = serde_json::to_string(response).map_err(ServerError::Json)?;
        self.output.extend_from_slice(body.as_bytes());
        self.output.push(b'\n');
        Ok(())
    }

    /// Retorna o output acumulado.
    pub fn get_output(&self) -> String {
        String::from_utf8_lossy(&self.output).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::JsonRpcId;
    use serde_json::json;

    #[test]
    fn test_read_message() {
        let input = "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\",\"params\":{}}\n";

        let mut transport = StringTransport::new(input);
        let request = transport.read_message().unwrap();

        assert_eq!(request.method, "initialize");
        assert_eq!(request.id, Some(JsonRpcId::Number(1)));
    }

    #[test]
    fn test_write_response_is_single_line() {
        let mut transport = StringTransport::new("");

        let response = JsonRpcResponse::success(Some(1.into()), json!({"status": "ok"}));
        transport.write_response(&response).unwrap();

        let output = transport.get_output();
        assert!(output.ends_with('\n'));

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1);

        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["jsonrpc"], "2.0");
        assert_eq!(parsed["result"]["status"], "ok");
    }

    #[test]
    fn test_multiple_messages() {
        let messages = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n"
        );

        let mut transport = StringTransport::new(messages);

        let first = transport.read_message().unwrap();
        assert_eq!(first.method, "initialize");

        let second = transport.read_message().unwrap();
        assert_eq!(second.method, "tools/list");
        assert_eq!(second.id, Some(JsonRpcId::Number(2)));
    }

    #[test]
    fn test_eof_and_empty_line_are_errors() {
        let mut empty = StringTransport::new("");
        assert!(empty.read_message().is_err());

        let mut blank = StringTransport::new("\n");
        assert!(blank.read_message().is_err());
    }

    #[test]
    fn test_invalid_json_is_error() {
        let mut transport = StringTransport::new("not valid json\n");
        assert!(transport.read_message().is_err());
    }

    #[test]
    fn test_notification_without_id() {
        let input = "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n";

        let mut transport = StringTransport::new(input);
        let request = transport.read_message().unwrap();

        assert_eq!(request.method, "notifications/initialized");
        assert!(request.id.is_none());
    }
}

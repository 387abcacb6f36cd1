//! # hotjar-mcp
//!
//! Servidor MCP para a API Hotjar.
//!
//! Expõe as operações de survey do Hotjar (listagem, detalhes, respostas)
//! como ferramentas MCP para agentes LLM, cuidando da autenticação OAuth2
//! client-credentials com cache de tokens por client id.
//!
//! ## Módulos
//!
//! - [`cli`] - Interface de linha de comando
//! - [`mcp`] - Servidor MCP (protocolo, transportes stdio e SSE, ferramentas)
//! - [`hotjar`] - Cliente da API Hotjar (token, dispatcher, operações)
//! - [`cache`] - Cache de tokens OAuth2
//! - [`types`] - Tipos compartilhados (config, erros, credenciais)

pub mod cache;
pub mod cli;
pub mod hotjar;
pub mod mcp;
pub mod types;

pub use types::config::Config;
pub use types::errors::{HotjarError, ServerError, ServerResult};

//! Integração com a API Hotjar.
//!
//! Três camadas, de baixo para cima:
//!
//! - [`transport`] - seam HTTP ([`ApiTransport`]) e a implementação reqwest
//! - [`auth`] - troca OAuth2 client-credentials com cache de tokens
//! - [`client`] - dispatcher autenticado e as operações de survey
//!
//! O fluxo de uma chamada de ferramenta: adapter MCP → operação de survey →
//! dispatcher → broker de token → HTTP.

mod auth;
mod client;
mod transport;

pub use auth::TokenBroker;
pub use client::HotjarClient;
pub use transport::{ApiResponse, ApiTransport, HttpTransport, TransportError};

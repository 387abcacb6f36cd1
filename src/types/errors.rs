//! Tipos de erro do hotjar-mcp.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

/// Tipo de resultado padrão do servidor.
pub type ServerResult<T> = Result<T, ServerError>;

/// Falhas da API Hotjar, classificadas por tipo.
///
/// Toda falha upstream é reduzida a uma destas três variantes antes de
/// chegar à camada de ferramentas MCP, que as converte em payloads de erro.
#[derive(Error, Debug, Clone)]
pub enum HotjarError {
    /// Credenciais ausentes, inválidas ou token expirado/rejeitado.
    #[error("{message}")]
    Authentication { message: String },

    /// Throttling upstream (HTTP 429). Carrega uma estimativa de reset.
    #[error("{message}")]
    RateLimit {
        message: String,
        reset_at: DateTime<Utc>,
    },

    /// Qualquer outra falha de API ou transporte, com status e corpo brutos.
    #[error("{message}")]
    Api {
        message: String,
        status: u16,
        body: Value,
    },
}

impl HotjarError {
    /// Cria um erro de autenticação.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Cria um erro de rate limit.
    pub fn rate_limit(message: impl Into<String>, reset_at: DateTime<Utc>) -> Self {
        Self::RateLimit {
            message: message.into(),
            reset_at,
        }
    }

    /// Cria um erro genérico de API.
    pub fn api(message: impl Into<String>, status: u16, body: Value) -> Self {
        Self::Api {
            message: message.into(),
            status,
            body,
        }
    }

    /// Status HTTP equivalente da falha.
    pub fn status(&self) -> u16 {
        match self {
            Self::Authentication { .. } => 401,
            Self::RateLimit { .. } => 429,
            Self::Api { status, .. } => *status,
        }
    }
}

/// Erros possíveis no servidor.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Erro de transporte: {0}")]
    Transport(String),

    #[error(transparent)]
    Hotjar(#[from] HotjarError),

    #[error("{0}")]
    Other(String),
}

impl ServerError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Cria um erro de transporte.
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::Transport(msg.into())
    }
}

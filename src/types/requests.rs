//! Tipos de requisição do hotjar-mcp.

use serde::{Deserialize, Serialize};

/// Credenciais OAuth2 (client credentials) da API Hotjar.
///
/// Fornecidas por chamada de ferramenta, com fallback para os defaults do
/// processo. Nunca são persistidas.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Client ID da aplicação Hotjar.
    pub client_id: Option<String>,

    /// Client secret da aplicação Hotjar.
    pub client_secret: Option<String>,
}

impl Credentials {
    /// Cria credenciais completas.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
        }
    }

    /// Verifica se ambos os campos estão presentes e não-vazios.
    pub fn is_complete(&self) -> bool {
        self.field_present(&self.client_id) && self.field_present(&self.client_secret)
    }

    /// Chave de cache do token: o client id.
    pub fn cache_key(&self) -> Option<&str> {
        self.client_id.as_deref().filter(|id| !id.is_empty())
    }

    fn field_present(&self, field: &Option<String>) -> bool {
        field.as_deref().is_some_and(|v| !v.is_empty())
    }
}

// Debug manual: o secret nunca aparece em logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("has_client_secret", &self.client_secret.is_some())
            .finish()
    }
}

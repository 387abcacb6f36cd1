//! Tipos de resposta upstream e do servidor.
//!
//! Os payloads da API Hotjar são repassados sem validação de schema; estas
//! structs capturam apenas os campos que o servidor precisa inspecionar.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload do endpoint OAuth2 `/oauth/token`.
///
/// Tolerante a campos ausentes: a ausência de `access_token` é tratada como
/// falha de autenticação pela camada de aquisição, não como erro de parse.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TokenResponse {
    /// Bearer token emitido.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Validade em segundos informada pelo servidor.
    #[serde(default)]
    pub expires_in: Option<i64>,

    /// Tipo do token (normalmente "Bearer").
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Página de resultados de uma operação de listagem.
///
/// `next_cursor` ausente ou nulo sinaliza a última página.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SurveyPage {
    /// Registros opacos retornados pela API.
    #[serde(default)]
    pub results: Vec<Value>,

    /// Cursor para a próxima página, quando houver.
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl SurveyPage {
    /// Verifica se há mais páginas a buscar.
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// Payload do endpoint `/health` (transporte SSE).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub server: String,
    pub version: String,
}

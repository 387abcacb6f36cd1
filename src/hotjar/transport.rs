//! Seam HTTP entre o cliente Hotjar e a rede.
//!
//! O trait [`ApiTransport`] isola o restante do crate da mecânica do
//! reqwest: o dispatcher e a camada de token enxergam apenas status + corpo
//! JSON. Os testes usam implementações fake com respostas roteirizadas.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Falha de transporte: a requisição não produziu resposta HTTP alguma
/// (falha de conexão, DNS, TLS).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Resposta crua de uma chamada à API.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Status HTTP.
    pub status: u16,

    /// Corpo decodificado como JSON; corpos não-JSON viram `Value::String`
    /// e corpos vazios viram `Value::Null`.
    pub body: Value,

    /// Header `Retry-After` em segundos, quando presente e parseável.
    pub retry_after: Option<i64>,
}

impl ApiResponse {
    /// Verifica se o status é 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transporte HTTP da API Hotjar.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// POST form-encoded (troca de token OAuth2).
    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<ApiResponse, TransportError>;

    /// GET autenticado com bearer token.
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        bearer: &str,
    ) -> Result<ApiResponse, TransportError>;
}

/// Implementação real sobre `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Cria um transporte com um client reqwest dedicado.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn into_api_response(response: reqwest::Response) -> Result<ApiResponse, TransportError> {
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::new(format!("Failed to read response body: {e}")))?;

        Ok(ApiResponse {
            status,
            body: parse_body(&bytes),
            retry_after,
        })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<ApiResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| TransportError::new(format!("Failed to reach {url}: {e}")))?;

        Self::into_api_response(response).await
    }

    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        bearer: &str,
    ) -> Result<ApiResponse, TransportError> {
        let mut url = reqwest::Url::parse(url)
            .map_err(|e| TransportError::new(format!("Invalid URL: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }

        let response = self
            .client
            .get(url.clone())
            .header("Authorization", format!("Bearer {bearer}"))
            .send()
            .await
            .map_err(|e| TransportError::new(format!("Failed to reach {url}: {e}")))?;

        Self::into_api_response(response).await
    }
}

/// Decodifica o corpo sem exigir JSON válido.
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_body_json() {
        let body = parse_body(br#"{"results": []}"#);
        assert_eq!(body, json!({"results": []}));
    }

    #[test]
    fn test_parse_body_non_json_falls_back_to_string() {
        let body = parse_body(b"Bad Gateway");
        assert_eq!(body, Value::String("Bad Gateway".to_string()));
    }

    #[test]
    fn test_parse_body_empty_is_null() {
        assert_eq!(parse_body(b""), Value::Null);
    }

    #[test]
    fn test_is_success_bounds() {
        let ok = ApiResponse {
            status: 200,
            body: Value::Null,
            retry_after: None,
        };
        assert!(ok.is_success());

        let redirect = ApiResponse {
            status: 301,
            ..ok.clone()
        };
        assert!(!redirect.is_success());
    }
}

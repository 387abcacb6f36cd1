//! Aquisição de tokens OAuth2 (client credentials) com cache por client id.

use chrono::Utc;
use tokio::sync::Mutex;

use crate::cache::{CacheStats, CachedToken, TokenCache};
use crate::types::errors::HotjarError;
use crate::types::requests::Credentials;
use crate::types::responses::TokenResponse;

use super::transport::ApiTransport;

/// Broker de tokens: valida credenciais, consulta o cache e, quando
/// necessário, executa a troca client-credentials no endpoint de token.
///
/// O lock do cache nunca é mantido através de uma chamada de rede: dois
/// misses concorrentes para a mesma chave podem ambos trocar credenciais,
/// e a última escrita vence.
pub struct TokenBroker {
    cache: Mutex<TokenCache>,
    token_url: String,
}

impl TokenBroker {
    /// Cria um broker para a base de API dada.
    pub fn new(api_base: &str, cache_capacity: usize) -> Self {
        Self {
            cache: Mutex::new(TokenCache::new(cache_capacity)),
            token_url: format!("{}/oauth/token", api_base.trim_end_matches('/')),
        }
    }

    /// Retorna um bearer token válido para as credenciais.
    ///
    /// Cache hit dentro da janela de validade não gera chamada de rede.
    pub async fn token(
        &self,
        transport: &dyn ApiTransport,
        credentials: &Credentials,
    ) -> Result<String, HotjarError> {
        let (client_id, client_secret) = match (
            credentials.client_id.as_deref(),
            credentials.client_secret.as_deref(),
        ) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => (id, secret),
            _ => {
                tracing::error!("Hotjar credentials not provided");
                return Err(HotjarError::authentication("Hotjar credentials not provided"));
            }
        };

        {
            let mut cache = self.cache.lock().await;
            if let Some(token) = cache.get(client_id, Utc::now()) {
                tracing::debug!(client_id, "Using cached token");
                return Ok(token);
            }
        }

        tracing::info!(client_id, "Requesting new token from Hotjar API");

        let response = transport
            .post_form(
                &self.token_url,
                &[
                    ("grant_type", "client_credentials"),
                    ("client_id", client_id),
                    ("client_secret", client_secret),
                ],
            )
            .await
            .map_err(|e| HotjarError::authentication(format!("Authentication failed: {e}")))?;

        if !response.is_success() {
            let description = response
                .body
                .get("error_description")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("token endpoint returned status {}", response.status));

            tracing::error!(status = response.status, "Token request failed");
            return Err(HotjarError::authentication(format!(
                "Authentication failed: {description}"
            )));
        }

        let payload: TokenResponse =
            serde_json::from_value(response.body).unwrap_or_default();

        let token = match payload.access_token {
            Some(token) if !token.is_empty() => token,
            _ => {
                tracing::error!("No access token received from Hotjar API");
                return Err(HotjarError::authentication("No access token received"));
            }
        };

        let issued_at = Utc::now();
        let entry = CachedToken::new(&token, payload.expires_in.unwrap_or(0), issued_at);

        tracing::info!(
            client_id,
            expires_at = %entry.expires_at,
            "Token obtained and cached"
        );

        // armazena antes de retornar: a próxima chamada já encontra a entrada
        let mut cache = self.cache.lock().await;
        cache.insert(client_id, entry);

        Ok(token)
    }

    /// Estatísticas do cache de tokens.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.lock().await.stats()
    }
}

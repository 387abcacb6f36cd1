//! Cliente da API Hotjar: dispatcher autenticado e operações de survey.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration, Utc};
use serde_json::Value;

use crate::cache::CacheStats;
use crate::types::config::HotjarConfig;
use crate::types::errors::HotjarError;
use crate::types::requests::Credentials;
use crate::types::responses::SurveyPage;

use super::auth::TokenBroker;
use super::transport::{ApiTransport, HttpTransport};

/// Estimativa fixa de reset quando o upstream não informa `Retry-After`.
const RATE_LIMIT_RESET_ESTIMATE_SECS: i64 = 60;

/// Cliente da API Hotjar.
///
/// Construído uma vez no start do processo e injetado nos caminhos de
/// atendimento; o cache de tokens vive dentro dele, não em estado global.
pub struct HotjarClient {
    transport: Arc<dyn ApiTransport>,
    broker: TokenBroker,
    api_base: String,
    api_limit: u32,
}

impl HotjarClient {
    /// Cria um cliente com o transporte HTTP real.
    pub fn new(config: &HotjarConfig) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    /// Cria um cliente com um transporte arbitrário (testes usam fakes).
    pub fn with_transport(config: &HotjarConfig, transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            transport,
            broker: TokenBroker::new(&config.api_base, 64),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_limit: config.api_limit,
        }
    }

    /// Retorna um bearer token válido para as credenciais (ver [`TokenBroker`]).
    pub async fn token(&self, credentials: &Credentials) -> Result<String, HotjarError> {
        self.broker.token(self.transport.as_ref(), credentials).await
    }

    /// Estatísticas do cache de tokens.
    pub async fn cache_stats(&self) -> CacheStats {
        self.broker.cache_stats().await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Dispatcher
    // ═══════════════════════════════════════════════════════════════════════

    /// Executa um GET autenticado contra a API.
    ///
    /// Falhas de autenticação da aquisição de token propagam inalteradas;
    /// respostas não-2xx são classificadas por [`classify_status`].
    pub async fn request(
        &self,
        endpoint: &str,
        query: &[(String, String)],
        credentials: &Credentials,
    ) -> Result<Value, HotjarError> {
        let started = Instant::now();
        tracing::info!(endpoint, "Making Hotjar API request");

        let token = self.token(credentials).await?;

        let url = format!("{}{}", self.api_base, endpoint);
        let response = match self.transport.get(&url, query, &token).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    endpoint,
                    duration_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "Hotjar API request failed"
                );
                return Err(HotjarError::api(
                    format!("Request failed: {e}"),
                    500,
                    Value::Null,
                ));
            }
        };

        if response.is_success() {
            tracing::info!(
                endpoint,
                status = response.status,
                duration_ms = started.elapsed().as_millis() as u64,
                "Hotjar API request successful"
            );
            return Ok(response.body);
        }

        tracing::error!(
            endpoint,
            status = response.status,
            duration_ms = started.elapsed().as_millis() as u64,
            "Hotjar API request failed"
        );
        Err(classify_status(
            response.status,
            response.body,
            response.retry_after,
        ))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Operações de survey
    // ═══════════════════════════════════════════════════════════════════════

    /// Lista as surveys de um site. GET `/sites/{siteId}/surveys`.
    pub async fn get_surveys(
        &self,
        credentials: &Credentials,
        site_id: &str,
        cursor: Option<&str>,
    ) -> Result<SurveyPage, HotjarError> {
        let endpoint = format!("/sites/{site_id}/surveys");
        let query = self.page_query(cursor);

        let body = self.request(&endpoint, &query, credentials).await?;
        let page = into_page(body)?;

        tracing::info!(site_id, count = page.results.len(), cursor, "Surveys retrieved");
        Ok(page)
    }

    /// Detalhes de uma survey. GET `/sites/{siteId}/surveys/{surveyId}`.
    pub async fn get_survey_details(
        &self,
        credentials: &Credentials,
        site_id: &str,
        survey_id: &str,
    ) -> Result<Value, HotjarError> {
        let endpoint = format!("/sites/{site_id}/surveys/{survey_id}");

        let details = self.request(&endpoint, &[], credentials).await?;

        tracing::info!(site_id, survey_id, "Survey details retrieved");
        Ok(details)
    }

    /// Respostas de uma survey. GET `/sites/{siteId}/surveys/{surveyId}/responses`.
    pub async fn get_survey_responses(
        &self,
        credentials: &Credentials,
        site_id: &str,
        survey_id: &str,
        cursor: Option<&str>,
    ) -> Result<SurveyPage, HotjarError> {
        let endpoint = format!("/sites/{site_id}/surveys/{survey_id}/responses");
        let query = self.page_query(cursor);

        let body = self.request(&endpoint, &query, credentials).await?;
        let page = into_page(body)?;

        tracing::info!(
            site_id,
            survey_id,
            count = page.results.len(),
            cursor,
            "Survey responses retrieved"
        );
        Ok(page)
    }

    /// Monta a query de paginação: limite fixo + cursor opcional repassado
    /// sem modificação.
    fn page_query(&self, cursor: Option<&str>) -> Vec<(String, String)> {
        let mut query = vec![("limit".to_string(), self.api_limit.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor".to_string(), cursor.to_string()));
        }
        query
    }
}

/// Classifica uma resposta não-2xx na taxonomia de erros.
fn classify_status(status: u16, body: Value, retry_after: Option<i64>) -> HotjarError {
    match status {
        // a mensagem do corpo é ignorada de propósito: 401 tem texto fixo
        401 => HotjarError::authentication("Invalid credentials or token expired"),
        429 => {
            let reset_secs = retry_after.unwrap_or(RATE_LIMIT_RESET_ESTIMATE_SECS);
            HotjarError::rate_limit(
                "Rate limit exceeded",
                Utc::now() + Duration::seconds(reset_secs),
            )
        }
        _ => {
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .map(|m| format!("API request failed: {m}"))
                .unwrap_or_else(|| format!("API request failed with status {status}"));
            HotjarError::api(message, status, body)
        }
    }
}

/// Converte o corpo de uma listagem em [`SurveyPage`].
fn into_page(body: Value) -> Result<SurveyPage, HotjarError> {
    serde_json::from_value(body.clone())
        .map_err(|e| HotjarError::api(format!("Unexpected response shape: {e}"), 500, body))
}

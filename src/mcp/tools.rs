//! Handlers das ferramentas MCP do hotjar-mcp.
//!
//! Três ferramentas, uma por operação de survey:
//!
//! 1. `getHotjarSurveys` - lista surveys de um site
//! 2. `getHotjarSurveyDetails` - detalhes de uma survey
//! 3. `getHotjarSurveyResponses` - respostas de uma survey
//!
//! Cada parâmetro é resolvido em camadas: valor da chamada, senão default
//! do processo, senão um payload de erro nomeando o parâmetro ausente.
//! Nenhum erro Hotjar vaza como falha JSON-RPC: tudo vira `ToolResult`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::hotjar::HotjarClient;
use crate::types::config::Config;
use crate::types::errors::HotjarError;
use crate::types::requests::Credentials;
use crate::types::responses::SurveyPage;

use super::protocol::{ToolDescription, ToolResult};

const SITE_ID_REQUIRED: &str =
    "Site ID is required. Either pass siteId parameter or set HOTJAR_SITE_ID environment variable.";
const SURVEY_ID_REQUIRED: &str =
    "Survey ID is required. Either pass surveyId parameter or set HOTJAR_SURVEY_ID environment variable.";
const CREDENTIALS_REQUIRED: &str =
    "Hotjar credentials are required. Either pass clientId/clientSecret parameters or set HOTJAR_CLIENT_ID and HOTJAR_CLIENT_SECRET environment variables.";

const PAGINATION_HINT: &str = "Pagination Info: To fetch the next page, call this tool again with cursor. If null next_cursor, this means no more results.";

// ═══════════════════════════════════════════════════════════════════════════
// Parâmetros das ferramentas
// ═══════════════════════════════════════════════════════════════════════════

/// Parâmetros de getHotjarSurveys.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SurveysParams {
    /// Client ID (fallback: HOTJAR_CLIENT_ID).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (fallback: HOTJAR_CLIENT_SECRET).
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Site (fallback: HOTJAR_SITE_ID).
    #[serde(default)]
    pub site_id: Option<String>,

    /// Cursor de paginação da resposta anterior.
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Parâmetros de getHotjarSurveyDetails.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDetailsParams {
    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default)]
    pub site_id: Option<String>,

    /// Survey (fallback: HOTJAR_SURVEY_ID).
    #[serde(default)]
    pub survey_id: Option<String>,
}

/// Parâmetros de getHotjarSurveyResponses.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponsesParams {
    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default)]
    pub site_id: Option<String>,

    #[serde(default)]
    pub survey_id: Option<String>,

    #[serde(default)]
    pub cursor: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Handler de ferramentas
// ═══════════════════════════════════════════════════════════════════════════

/// Handler das ferramentas MCP.
pub struct ToolHandler {
    config: Config,
    client: HotjarClient,
}

impl ToolHandler {
    /// Cria um handler com o cliente HTTP real.
    pub fn new(config: Config) -> Self {
        let client = HotjarClient::new(&config.hotjar);
        Self { config, client }
    }

    /// Cria um handler com um cliente arbitrário (testes injetam fakes).
    pub fn with_client(config: Config, client: HotjarClient) -> Self {
        Self { config, client }
    }

    /// Lista todas as ferramentas disponíveis.
    pub fn list_tools() -> Vec<ToolDescription> {
        vec![
            ToolDescription::new(
                "getHotjarSurveys",
                "Get surveys for a specific Hotjar site",
                json!({
                    "type": "object",
                    "properties": {
                        "clientId": {
                            "type": "string",
                            "description": "Hotjar Client ID"
                        },
                        "clientSecret": {
                            "type": "string",
                            "description": "Hotjar Client Secret"
                        },
                        "siteId": {
                            "type": "string",
                            "description": "Hotjar site ID"
                        },
                        "cursor": {
                            "type": "string",
                            "description": "Cursor for pagination next page (from previous response's next_cursor field). Omit for first page."
                        }
                    },
                    "required": []
                }),
            ),
            ToolDescription::new(
                "getHotjarSurveyDetails",
                "Get detailed information for a specific Hotjar survey",
                json!({
                    "type": "object",
                    "properties": {
                        "clientId": {
                            "type": "string",
                            "description": "Hotjar Client ID"
                        },
                        "clientSecret": {
                            "type": "string",
                            "description": "Hotjar Client Secret"
                        },
                        "siteId": {
                            "type": "string",
                            "description": "Hotjar site ID"
                        },
                        "surveyId": {
                            "type": "string",
                            "description": "Hotjar survey ID"
                        }
                    },
                    "required": []
                }),
            ),
            ToolDescription::new(
                "getHotjarSurveyResponses",
                "Get responses for a specific Hotjar survey",
                json!({
                    "type": "object",
                    "properties": {
                        "clientId": {
                            "type": "string",
                            "description": "Hotjar Client ID"
                        },
                        "clientSecret": {
                            "type": "string",
                            "description": "Hotjar Client Secret"
                        },
                        "siteId": {
                            "type": "string",
                            "description": "Hotjar site ID"
                        },
                        "surveyId": {
                            "type": "string",
                            "description": "Hotjar survey ID"
                        },
                        "cursor": {
                            "type": "string",
                            "description": "Cursor for pagination next page (from previous response's next_cursor field). Omit for first page."
                        }
                    },
                    "required": []
                }),
            ),
        ]
    }

    /// Processa uma chamada de ferramenta.
    pub async fn handle_tool_call(&self, name: &str, arguments: Value) -> ToolResult {
        tracing::info!(tool = name, "Processing tool call");

        match name {
            "getHotjarSurveys" => self.handle_get_surveys(arguments).await,
            "getHotjarSurveyDetails" => self.handle_get_survey_details(arguments).await,
            "getHotjarSurveyResponses" => self.handle_get_survey_responses(arguments).await,
            _ => ToolResult::error(format!("Unknown tool: {}", name)),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Handlers individuais
    // ═══════════════════════════════════════════════════════════════════════

    async fn handle_get_surveys(&self, arguments: Value) -> ToolResult {
        let params: SurveysParams = match serde_json::from_value(arguments) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid parameters: {}", e)),
        };

        let credentials = self.resolve_credentials(params.client_id, params.client_secret);
        let Some(site_id) = params.site_id.or_else(|| self.config.hotjar.site_id.clone()) else {
            return ToolResult::error(SITE_ID_REQUIRED);
        };
        if !credentials.is_complete() {
            return ToolResult::error(CREDENTIALS_REQUIRED);
        }

        match self
            .client
            .get_surveys(&credentials, &site_id, params.cursor.as_deref())
            .await
        {
            Ok(page) => ToolResult::success(format!(
                "Hotjar Surveys for Site {};\nResponse: {}\n{}",
                site_id,
                render_page(&page),
                PAGINATION_HINT
            )),
            Err(e) => error_payload("Error fetching Hotjar surveys", &e),
        }
    }

    async fn handle_get_survey_details(&self, arguments: Value) -> ToolResult {
        let params: SurveyDetailsParams = match serde_json::from_value(arguments) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid parameters: {}", e)),
        };

        let credentials = self.resolve_credentials(params.client_id, params.client_secret);
        let Some(site_id) = params.site_id.or_else(|| self.config.hotjar.site_id.clone()) else {
            return ToolResult::error(SITE_ID_REQUIRED);
        };
        let Some(survey_id) = params
            .survey_id
            .or_else(|| self.config.hotjar.survey_id.clone())
        else {
            return ToolResult::error(SURVEY_ID_REQUIRED);
        };
        if !credentials.is_complete() {
            return ToolResult::error(CREDENTIALS_REQUIRED);
        }

        match self
            .client
            .get_survey_details(&credentials, &site_id, &survey_id)
            .await
        {
            Ok(details) => ToolResult::success(format!(
                "Hotjar Survey Details for Survey {};\nResponse: {}",
                survey_id,
                serde_json::to_string_pretty(&details).unwrap_or_default()
            )),
            Err(e) => error_payload("Error fetching Hotjar survey details", &e),
        }
    }

    async fn handle_get_survey_responses(&self, arguments: Value) -> ToolResult {
        let params: SurveyResponsesParams = match serde_json::from_value(arguments) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid parameters: {}", e)),
        };

        let credentials = self.resolve_credentials(params.client_id, params.client_secret);
        let Some(site_id) = params.site_id.or_else(|| self.config.hotjar.site_id.clone()) else {
            return ToolResult::error(SITE_ID_REQUIRED);
        };
        let Some(survey_id) = params
            .survey_id
            .or_else(|| self.config.hotjar.survey_id.clone())
        else {
            return ToolResult::error(SURVEY_ID_REQUIRED);
        };
        if !credentials.is_complete() {
            return ToolResult::error(CREDENTIALS_REQUIRED);
        }

        match self
            .client
            .get_survey_responses(&credentials, &site_id, &survey_id, params.cursor.as_deref())
            .await
        {
            Ok(page) => ToolResult::success(format!(
                "Hotjar Survey Responses for Survey {};\nResponse: {}\n{}",
                survey_id,
                render_page(&page),
                PAGINATION_HINT
            )),
            Err(e) => error_payload("Error fetching Hotjar survey responses", &e),
        }
    }

    /// Resolve credenciais: parâmetro da chamada, senão default do processo.
    fn resolve_credentials(
        &self,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Credentials {
        let defaults = self.config.hotjar.default_credentials();
        Credentials {
            client_id: client_id.or(defaults.client_id),
            client_secret: client_secret.or(defaults.client_secret),
        }
    }
}

/// Serializa uma página mantendo o campo next_cursor (nulo na última página).
fn render_page(page: &SurveyPage) -> String {
    serde_json::to_string_pretty(page).unwrap_or_default()
}

/// Converte um [`HotjarError`] em payload de erro, distinguindo os três
/// tipos na mensagem.
fn error_payload(context: &str, error: &HotjarError) -> ToolResult {
    match error {
        HotjarError::Authentication { message } => {
            ToolResult::error(format!("Authentication Error: {}", message))
        }
        HotjarError::RateLimit { message, reset_at } => ToolResult::error(format!(
            "Rate Limit Error: {}. Resets at: {}",
            message,
            reset_at.to_rfc3339()
        )),
        HotjarError::Api { message, .. } => {
            ToolResult::error(format!("{}: {}", context, message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_list_tools() {
        let tools = ToolHandler::list_tools();
        assert_eq!(tools.len(), 3);

        let tool_names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert!(tool_names.contains(&"getHotjarSurveys"));
        assert!(tool_names.contains(&"getHotjarSurveyDetails"));
        assert!(tool_names.contains(&"getHotjarSurveyResponses"));
    }

    #[test]
    fn test_tool_schemas_use_camel_case_params() {
        let tools = ToolHandler::list_tools();
        let responses = tools
            .iter()
            .find(|t| t.name == "getHotjarSurveyResponses")
            .unwrap();

        let props = &responses.input_schema["properties"];
        assert!(props["clientId"].is_object());
        assert!(props["clientSecret"].is_object());
        assert!(props["siteId"].is_object());
        assert!(props["surveyId"].is_object());
        assert!(props["cursor"].is_object());

        // todos os parâmetros são opcionais: o fallback vem do ambiente
        assert_eq!(responses.input_schema["required"], json!([]));
    }

    #[test]
    fn test_surveys_params_deserialize_camel_case() {
        let params: SurveysParams = serde_json::from_value(json!({
            "clientId": "id-1",
            "clientSecret": "s-1",
            "siteId": "42",
            "cursor": "abc"
        }))
        .unwrap();

        assert_eq!(params.client_id.as_deref(), Some("id-1"));
        assert_eq!(params.site_id.as_deref(), Some("42"));
        assert_eq!(params.cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn test_params_all_optional() {
        let params: SurveyResponsesParams = serde_json::from_value(json!({})).unwrap();
        assert!(params.client_id.is_none());
        assert!(params.survey_id.is_none());
    }

    #[test]
    fn test_resolve_credentials_prefers_call_params() {
        let mut config = Config::default();
        config.hotjar.client_id = Some("default-id".to_string());
        config.hotjar.client_secret = Some("default-secret".to_string());
        let handler = ToolHandler::new(config);

        let creds = handler.resolve_credentials(Some("call-id".to_string()), None);
        assert_eq!(creds.client_id.as_deref(), Some("call-id"));
        assert_eq!(creds.client_secret.as_deref(), Some("default-secret"));
    }

    #[tokio::test]
    async fn test_missing_site_id_names_the_parameter() {
        let handler = ToolHandler::new(Config::default());

        let result = handler
            .handle_tool_call("getHotjarSurveys", json!({"clientId": "a", "clientSecret": "b"}))
            .await;

        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("Site ID is required"));
    }

    #[tokio::test]
    async fn test_missing_survey_id_names_the_parameter() {
        let handler = ToolHandler::new(Config::default());

        let result = handler
            .handle_tool_call(
                "getHotjarSurveyDetails",
                json!({"clientId": "a", "clientSecret": "b", "siteId": "1"}),
            )
            .await;

        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("Survey ID is required"));
    }

    #[tokio::test]
    async fn test_missing_credentials_reported_before_network() {
        let handler = ToolHandler::new(Config::default());

        let result = handler
            .handle_tool_call("getHotjarSurveys", json!({"siteId": "1"}))
            .await;

        assert!(result.is_error);
        assert!(result
            .first_text()
            .unwrap()
            .contains("Hotjar credentials are required"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let handler = ToolHandler::new(Config::default());
        let result = handler.handle_tool_call("doesNotExist", json!({})).await;

        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("Unknown tool"));
    }

    #[test]
    fn test_error_payload_authentication() {
        let err = HotjarError::authentication("No access token received");
        let result = error_payload("Error fetching Hotjar surveys", &err);

        assert!(result.is_error);
        assert_eq!(
            result.first_text().unwrap(),
            "Authentication Error: No access token received"
        );
    }

    #[test]
    fn test_error_payload_rate_limit_includes_reset() {
        let reset = Utc::now();
        let err = HotjarError::rate_limit("Rate limit exceeded", reset);
        let result = error_payload("Error fetching Hotjar surveys", &err);

        let text = result.first_text().unwrap();
        assert!(text.starts_with("Rate Limit Error: Rate limit exceeded. Resets at: "));
        assert!(text.contains(&reset.to_rfc3339()));
    }

    #[test]
    fn test_error_payload_generic_uses_context() {
        let err = HotjarError::api("API request failed: boom", 500, Value::Null);
        let result = error_payload("Error fetching Hotjar survey responses", &err);

        assert_eq!(
            result.first_text().unwrap(),
            "Error fetching Hotjar survey responses: API request failed: boom"
        );
    }

    #[test]
    fn test_render_page_keeps_null_cursor() {
        let page = SurveyPage {
            results: vec![json!({"id": 1})],
            next_cursor: None,
        };
        let rendered = render_page(&page);
        assert!(rendered.contains("\"next_cursor\": null"));
    }
}

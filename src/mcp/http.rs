//! Transporte SSE (event-stream) sobre HTTP.
//!
//! Espelha o transporte SSE do SDK MCP original:
//!
//! - `GET /sse` abre o event stream e aloca uma sessão; o primeiro evento é
//!   `endpoint`, com a URL de postagem `/messages?sessionId=<uuid>`
//! - `POST /messages?sessionId=` recebe uma request JSON-RPC, despacha ao
//!   núcleo compartilhado e entrega a resposta pelo stream da sessão
//! - `GET /health` responde nome/versão do servidor como sinal de liveness
//!
//! Uma sessão por conexão; a desconexão remove a sessão do mapa.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{mpsc, RwLock};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

use crate::types::errors::ServerError;
use crate::types::responses::HealthResponse;
use crate::ServerResult;

use super::protocol::{JsonRpcRequest, SERVER_NAME};
use super::server::McpServer;

/// Capacidade do canal de eventos de cada sessão.
const SESSION_CHANNEL_CAPACITY: usize = 16;

type SessionMap = Arc<RwLock<HashMap<String, mpsc::Sender<Event>>>>;

/// Estado compartilhado do transporte SSE.
#[derive(Clone)]
pub struct SseState {
    server: Arc<McpServer>,
    sessions: SessionMap,
}

impl SseState {
    /// Cria o estado do transporte em torno de um núcleo de servidor.
    pub fn new(server: Arc<McpServer>) -> Self {
        Self {
            server,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Número de sessões ativas.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Monta o router axum do transporte SSE.
pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/sse", get(sse_handler))
        .route("/messages", post(messages_handler))
        .route("/health", get(health_handler))
        .with_state(SseState::new(server))
}

/// Sobe o servidor HTTP na porta dada. Bloqueia até o processo encerrar.
pub async fn run_sse(server: Arc<McpServer>, port: u16) -> ServerResult<()> {
    let app = router(server);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(ServerError::Io)?;

    tracing::info!(
        "{} v{} running on port {}",
        SERVER_NAME,
        env!("CARGO_PKG_VERSION"),
        port
    );
    tracing::info!("SSE endpoint: http://localhost:{port}/sse");
    tracing::info!("Health check: http://localhost:{port}/health");

    axum::serve(listener, app).await.map_err(ServerError::Io)?;
    Ok(())
}

// Remove a sessão do mapa quando o stream da conexão é dropado.
struct SessionGuard {
    session_id: String,
    sessions: SessionMap,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let session_id = std::mem::take(&mut self.session_id);
        let sessions = Arc::clone(&self.sessions);
        tokio::spawn(async move {
            sessions.write().await.remove(&session_id);
            tracing::info!(%session_id, "SSE connection closed");
        });
    }
}

async fn sse_handler(
    State(state): State<SseState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = Uuid::new_v4().to_string();
    tracing::info!(%session_id, "New SSE connection established");

    let (tx, rx) = mpsc::channel::<Event>(SESSION_CHANNEL_CAPACITY);

    // o primeiro evento informa ao cliente onde postar as mensagens
    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/messages?sessionId={session_id}"));
    let _ = tx.send(endpoint).await;

    state
        .sessions
        .write()
        .await
        .insert(session_id.clone(), tx);

    let guard = SessionGuard {
        session_id,
        sessions: Arc::clone(&state.sessions),
    };

    let stream = ReceiverStream::new(rx).map(move |event| {
        let _ = &guard;
        Ok::<Event, Infallible>(event)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    #[serde(rename = "sessionId")]
    session_id: String,
}

async fn messages_handler(
    State(state): State<SseState>,
    Query(query): Query<SessionQuery>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    let sender = {
        let sessions = state.sessions.read().await;
        sessions.get(&query.session_id).cloned()
    };

    let Some(sender) = sender else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Session not found"})),
        );
    };

    let is_notification = request.is_notification();
    let response = state.server.handle_request(request).await;

    // notificações não produzem resposta no stream
    if !is_notification {
        let payload = match serde_json::to_string(&response) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Failed to serialize response"})),
                );
            }
        };

        let event = Event::default().event("message").data(payload);
        if sender.send(event).await.is_err() {
            tracing::warn!(session_id = %query.session_id, "Session dropped before reply");
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "Session not found"})),
            );
        }
    }

    (StatusCode::ACCEPTED, Json(json!({"status": "accepted"})))
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        server: SERVER_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

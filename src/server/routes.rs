//! HTTP route handlers for the Parley API.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::conversation::{ConversationError, Message};
use crate::session::TurnOutcome;

use super::state::AppState;

/// Create the API router with all routes.
#[must_use]
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(chat_turn))
        .route("/api/history", get(history))
        .route("/api/clear", post(clear_history))
        .route(
            "/api/personality",
            get(get_personality).put(update_personality),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "parley-agent",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Chat turn request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The transcribed or typed utterance.
    pub message: String,
}

/// Chat turn response.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Text to display or speak.
    pub response: String,
    /// Model used.
    pub model: String,
    /// Whether `response` reports a failed completion.
    pub is_error: bool,
    /// Voice command that was recognized instead of a chat turn, if any.
    pub command: Option<&'static str>,
}

/// Conversation history response.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Active personality directive.
    pub personality: String,
    /// Logged messages, oldest first.
    pub messages: Vec<Message>,
}

/// Personality read/update payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersonalityPayload {
    /// Personality directive.
    pub personality: String,
}

fn error_response(err: &ConversationError) -> (StatusCode, String) {
    let status = match err {
        ConversationError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

/// Run one turn: commands act on the session, anything else is answered.
async fn chat_turn(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    // The task owns the guard; the turn completes even if this request is dropped.
    let mut assistant = Arc::clone(&state.assistant).lock_owned().await;
    let turn = tokio::spawn(async move { assistant.handle(&request.message).await });
    let outcome = turn
        .await
        .map_err(|err| {
            tracing::error!("Chat turn task failed: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        })?
        .map_err(|err| error_response(&err))?;

    let (response, is_error, command) = match outcome {
        TurnOutcome::Replied(reply) => (reply.text, reply.is_error, None),
        TurnOutcome::Exit => ("Goodbye!".to_string(), false, Some("exit")),
        TurnOutcome::Cleared => (
            "Conversation history cleared!".to_string(),
            false,
            Some("clear"),
        ),
        TurnOutcome::PersonalityRequested => (
            "Send the new personality to /api/personality.".to_string(),
            false,
            Some("personality"),
        ),
        TurnOutcome::Silence => (
            "No speech detected. Please try again.".to_string(),
            false,
            Some("silence"),
        ),
    };

    Ok(Json(ChatResponse {
        response,
        model: state.model_name.clone(),
        is_error,
        command,
    }))
}

/// Return the full conversation log and directive.
async fn history(State(state): State<Arc<AppState>>) -> Json<HistoryResponse> {
    let assistant = state.assistant.lock().await;
    let store = assistant.store();
    Json(HistoryResponse {
        personality: store.personality().to_string(),
        messages: store.messages().to_vec(),
    })
}

/// Wipe the conversation history.
async fn clear_history(
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .assistant
        .lock()
        .await
        .clear()
        .map_err(|err| error_response(&err))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Return the active directive.
async fn get_personality(State(state): State<Arc<AppState>>) -> Json<PersonalityPayload> {
    let assistant = state.assistant.lock().await;
    Json(PersonalityPayload {
        personality: assistant.store().personality().to_string(),
    })
}

/// Replace the directive.
async fn update_personality(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PersonalityPayload>,
) -> Result<Json<PersonalityPayload>, (StatusCode, String)> {
    let mut assistant = state.assistant.lock().await;
    assistant
        .update_personality(&payload.personality)
        .map_err(|err| error_response(&err))?;
    Ok(Json(PersonalityPayload {
        personality: assistant.store().personality().to_string(),
    }))
}

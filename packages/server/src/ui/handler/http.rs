//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::{ConversationId, MessagingError, Page, UserId},
    infrastructure::dto::{
        http::{
            ConversationDto, CreateConversationRequestDto, ErrorDto, HealthDto, PageQuery,
            PresenceDto,
        },
        websocket::MessageDto,
    },
    ui::state::AppState,
};

use super::auth::AuthenticatedUser;

/// `{"error": <message>}` with the given status
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorDto {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Map a collaborator failure onto an HTTP status
fn messaging_error_response(e: MessagingError) -> Response {
    let status = match e {
        MessagingError::ConversationNotFound(_) => StatusCode::NOT_FOUND,
        MessagingError::Forbidden => StatusCode::FORBIDDEN,
        MessagingError::EmptyContent => StatusCode::BAD_REQUEST,
        MessagingError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, &e.to_string())
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}

/// Get presence of a user (online when at least one connection is registered)
pub async fn get_presence(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<PresenceDto>, Response> {
    let user_id = UserId::new(user_id)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, &e.to_string()))?;

    let presence = state.get_presence_usecase.execute(user_id).await;

    // Domain Model から DTO への変換
    Ok(Json(PresenceDto {
        online: presence.is_online(),
        user_id: presence.user_id.into_string(),
        connections: presence.connections,
    }))
}

/// Create a conversation; the caller is always a participant
///
/// 空の参加者 ID は無視する。
pub async fn create_conversation(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(creator): AuthenticatedUser,
    body: Result<Json<CreateConversationRequestDto>, JsonRejection>,
) -> Result<(StatusCode, Json<ConversationDto>), Response> {
    let Json(request) = body.map_err(|e| {
        tracing::debug!(error = %e, "Invalid create conversation request");
        error_response(StatusCode::BAD_REQUEST, "Invalid request")
    })?;

    let participant_ids: Vec<UserId> = request
        .participant_ids
        .into_iter()
        .filter_map(|id| UserId::new(id).ok())
        .collect();

    let conversation = state
        .create_conversation_usecase
        .execute(&creator, participant_ids)
        .await
        .map_err(messaging_error_response)?;

    Ok((StatusCode::CREATED, Json(conversation.into())))
}

/// List the caller's conversations, most recently updated first
pub async fn get_conversations(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<ConversationDto>>, Response> {
    let conversations = state
        .get_conversations_usecase
        .execute(&user_id, Page::from(query))
        .await
        .map_err(messaging_error_response)?;

    Ok(Json(conversations.into_iter().map(Into::into).collect()))
}

/// List a conversation's messages, newest first (participants only)
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(conversation_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<MessageDto>>, Response> {
    let conversation_id = ConversationId::new(conversation_id)
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "Invalid conversation ID"))?;

    let messages = state
        .get_messages_usecase
        .execute(&user_id, &conversation_id, Page::from(query))
        .await
        .map_err(messaging_error_response)?;

    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

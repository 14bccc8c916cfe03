use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use parley_core::{Message, MessageDraft, Username, assemble};

use crate::auth::identity::CallerIdentity;
use crate::error::ServerError;

use super::AppState;
use super::schemas::ErrorResponse;

/// Query parameters for the conversation history endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Case-insensitive text filter applied to message text and
    /// attachment names.
    pub filter: Option<String>,
}

/// `GET /v1/messages/{peer}` -- fetch the caller's conversation with `peer`.
///
/// Returns every message exchanged between the authenticated user and
/// the named peer, ordered oldest first. Messages involving anyone else
/// never appear, regardless of what is in the store.
#[utoipa::path(
    get,
    path = "/v1/messages/{peer}",
    tag = "Messages",
    summary = "Conversation history",
    description = "Returns the full conversation between the caller and the named peer, oldest first.",
    params(
        ("peer" = String, Path, description = "The other participant's username"),
        ("filter" = Option<String>, Query, description = "Case-insensitive text filter")
    ),
    responses(
        (status = 200, description = "Conversation messages", body = Vec<Message>),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn history(
    State(state): State<AppState>,
    axum::Extension(identity): axum::Extension<CallerIdentity>,
    Path(peer): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let me = identity.username;
    let peer = Username::new(peer);

    let all = state.broker.store().find_all_involving(&me).await?;
    let conversation = assemble(&all, &me, &peer, query.filter.as_deref());

    Ok((StatusCode::OK, Json(conversation)))
}

/// `GET /v1/messages` -- fetch every message involving the caller.
///
/// The raw material for client-side conversation assembly: all messages
/// the authenticated user sent or received, across every peer, in store
/// order. A session that lagged behind the delivery stream re-fetches
/// this and rebuilds its per-peer views locally.
#[utoipa::path(
    get,
    path = "/v1/messages",
    tag = "Messages",
    summary = "Full message history",
    description = "Returns every message the caller sent or received, across all conversations, in store order.",
    responses(
        (status = 200, description = "All messages involving the caller", body = Vec<Message>),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn all_messages(
    State(state): State<AppState>,
    axum::Extension(identity): axum::Extension<CallerIdentity>,
) -> Result<impl IntoResponse, ServerError> {
    let all = state
        .broker
        .store()
        .find_all_involving(&identity.username)
        .await?;
    Ok((StatusCode::OK, Json(all)))
}

/// `POST /v1/messages` -- submit a message to the delivery pipeline.
///
/// The draft's sender must match the authenticated user. On success the
/// message has been persisted and fanned out to all connected sessions,
/// and the stored record (with id and timestamp) is returned.
#[utoipa::path(
    post,
    path = "/v1/messages",
    tag = "Messages",
    summary = "Send message",
    description = "Validates, persists, and fans out a message. The sender must be the authenticated user.",
    request_body(content = MessageDraft, description = "Message to send"),
    responses(
        (status = 201, description = "Message persisted and delivered", body = Message),
        (status = 400, description = "Invalid draft", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Sender does not match the caller", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn submit(
    State(state): State<AppState>,
    axum::Extension(identity): axum::Extension<CallerIdentity>,
    Json(draft): Json<MessageDraft>,
) -> Result<impl IntoResponse, ServerError> {
    if draft.sender_username != identity.username {
        return Ok((
            StatusCode::FORBIDDEN,
            Json(serde_json::json!(ErrorResponse {
                error: "senderUsername must match the authenticated user".into(),
            })),
        )
            .into_response());
    }

    let message = state.broker.submit(draft).await?;
    Ok((StatusCode::CREATED, Json(message)).into_response())
}

//! SSE event streaming endpoint.
//!
//! `GET /v1/stream` lets an authenticated session receive real-time
//! message deliveries as Server-Sent Events.
//!
//! Every connected session receives every delivered message; the client
//! filters down to the conversation it is viewing. A session that falls
//! behind the broadcast channel receives a `lagged` event telling it how
//! many events were skipped, and is expected to re-fetch history.

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{debug, warn};

use parley_broker::SessionGuard;
use parley_core::ChatEvent;

use crate::auth::identity::CallerIdentity;

use super::AppState;
use super::schemas::ErrorResponse;

/// `GET /v1/stream` -- subscribe to real-time message deliveries via SSE.
///
/// Counts against the caller's per-user session cap; the slot is
/// released when the client disconnects. Reconnecting clients should
/// re-fetch conversation history, since events emitted while
/// disconnected are not replayed.
#[utoipa::path(
    get,
    path = "/v1/stream",
    tag = "Stream",
    summary = "Real-time event stream",
    description = "Server-Sent Events stream of message deliveries for the authenticated user.",
    responses(
        (status = 200, description = "SSE stream established"),
        (status = 401, description = "Missing or invalid token"),
        (status = 429, description = "Too many concurrent sessions", body = ErrorResponse)
    )
)]
#[allow(clippy::unused_async)]
pub async fn stream(
    State(state): State<AppState>,
    axum::Extension(identity): axum::Extension<CallerIdentity>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let guard = state.broker.connect(identity.username.as_str()).map_err(|e| {
        warn!(user = %identity.username, "session cap reached");
        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!(ErrorResponse {
                error: e.to_string()
            })),
        )
    })?;

    debug!(user = %identity.username, "session connected");
    let rx = state.broker.subscribe();
    let event_stream = make_event_stream(rx, guard);

    Ok(Sse::new(event_stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    ))
}

/// Build the SSE event stream from the broadcast receiver.
///
/// The session guard is moved into the stream so it is dropped when the
/// client disconnects, releasing the session slot.
fn make_event_stream(
    rx: broadcast::Receiver<ChatEvent>,
    guard: SessionGuard,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(move |item| {
        let _guard = &guard;
        match item {
            Ok(event) => sse_event(&event).map(Ok),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "session lagged behind the broadcast channel");
                let data = serde_json::json!({ "skipped": skipped }).to_string();
                Some(Ok(Event::default().event("lagged").data(data)))
            }
        }
    })
}

fn sse_event(event: &ChatEvent) -> Option<Event> {
    let data = serde_json::to_string(event).ok()?;
    Some(
        Event::default()
            .id(event.id.clone())
            .event(event.type_tag())
            .data(data),
    )
}

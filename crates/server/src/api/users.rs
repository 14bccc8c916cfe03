use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::schemas::ExistsResponse;

/// `GET /v1/users/{username}/exists` -- check whether a username is registered.
///
/// Used by clients to validate a recipient before starting a
/// conversation. Intentionally returns `exists: false` rather than a
/// 404 so the client-side flow is a plain boolean check.
#[utoipa::path(
    get,
    path = "/v1/users/{username}/exists",
    tag = "Users",
    summary = "Username existence check",
    description = "Returns whether the given username belongs to a registered user.",
    params(("username" = String, Path, description = "Username to check")),
    responses(
        (status = 200, description = "Existence result", body = ExistsResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn exists(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    let exists = state.auth.user_exists(&username);
    (StatusCode::OK, Json(ExistsResponse { exists }))
}

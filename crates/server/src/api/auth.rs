use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::auth::RegisterError;

use super::AppState;
use super::schemas::{ErrorResponse, LoginRequest, LoginResponse, RegisterRequest};

/// `POST /v1/auth/register` -- create a new account.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    tag = "Auth",
    summary = "Register",
    description = "Create a new account with a unique username and email.",
    request_body(content = RegisterRequest, description = "New account details"),
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
        (status = 409, description = "Username or email already taken", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> impl IntoResponse {
    match state.auth.register(&body.username, &body.email, &body.password) {
        Ok(()) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "status": "registered" })),
        ),
        Err(e) => {
            let status = match e {
                RegisterError::UsernameTaken | RegisterError::EmailTaken => StatusCode::CONFLICT,
                RegisterError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                RegisterError::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(serde_json::json!(ErrorResponse {
                    error: e.to_string()
                })),
            )
        }
    }
}

/// `POST /v1/auth/login` -- authenticate with email/password and receive a JWT.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Auth",
    summary = "Login",
    description = "Authenticate with email and password to receive a Bearer token.",
    request_body(content = LoginRequest, description = "Login credentials"),
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> impl IntoResponse {
    match state.auth.login(&body.email, &body.password) {
        Ok(issued) => (
            StatusCode::OK,
            Json(serde_json::json!(LoginResponse {
                token: issued.token,
                username: issued.username.to_string(),
                expires_in: issued.expires_in,
            })),
        ),
        Err(e) => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!(ErrorResponse { error: e })),
        ),
    }
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error description.
    #[schema(example = "invalid email or password")]
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status indicator.
    #[schema(example = "ok")]
    pub status: String,
    /// Current broker metrics snapshot.
    pub metrics: MetricsResponse,
}

/// Broker delivery metrics counters.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    /// Total message drafts submitted.
    #[schema(example = 142)]
    pub submitted: u64,
    /// Drafts rejected by validation.
    #[schema(example = 3)]
    pub rejected: u64,
    /// Submissions that failed at the persistence step.
    #[schema(example = 1)]
    pub store_failed: u64,
    /// Messages persisted and fanned out.
    #[schema(example = 138)]
    pub delivered: u64,
    /// Currently connected real-time sessions.
    #[schema(example = 4)]
    pub active_sessions: usize,
}

/// Request body for creating an account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Desired username.
    #[schema(example = "alice")]
    pub username: String,
    /// Email address, unique per account.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Plaintext password; stored only as an argon2 hash.
    pub password: String,
}

/// Request body for logging in.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Account email address.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Response after a successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// Username the token authenticates as.
    #[schema(example = "alice")]
    pub username: String,
    /// Token lifetime in seconds.
    #[schema(example = 86_400)]
    pub expires_in: u64,
}

/// Response for the username existence check.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExistsResponse {
    /// Whether the username belongs to a registered user.
    #[schema(example = true)]
    pub exists: bool,
}

pub mod auth;
pub mod health;
pub mod messages;
pub mod openapi;
pub mod schemas;
pub mod stream;
pub mod upload;
pub mod users;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use parley_blob::{BlobStore, MAX_BLOB_BYTES};
use parley_broker::Broker;

use crate::auth::AuthProvider;
use crate::auth::middleware::AuthLayer;

use self::openapi::ApiDoc;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The delivery broker.
    pub broker: Arc<Broker>,
    /// Blob store for file attachments.
    pub blob: Arc<dyn BlobStore>,
    /// Authentication provider.
    pub auth: Arc<AuthProvider>,
    /// Directory attachments are served from.
    pub uploads_dir: String,
}

/// Request-body cap for the upload route. Leaves room above the blob
/// cap for multipart framing, so an oversized file reaches the policy
/// check and gets a 413 instead of a body-read error.
const UPLOAD_BODY_LIMIT: usize = MAX_BLOB_BYTES as usize + 2 * 1024 * 1024;

/// Build the Axum router with all API routes, middleware, and Swagger UI.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        // Health & metrics (always public)
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics))
        // Account creation and login (must be public)
        .route("/v1/auth/register", post(auth::register))
        .route("/v1/auth/login", post(auth::login));

    let protected = Router::new()
        // Recipient validation
        .route("/v1/users/{username}/exists", get(users::exists))
        // Attachment upload
        .route(
            "/v1/upload",
            post(upload::upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // Messages
        .route(
            "/v1/messages",
            post(messages::submit).get(messages::all_messages),
        )
        .route("/v1/messages/{peer}", get(messages::history))
        // SSE event streaming
        .route("/v1/stream", get(stream::stream))
        .layer(AuthLayer::new(Arc::clone(&state.auth)));

    Router::new()
        .merge(public)
        .merge(protected)
        // Uploaded attachments, served as static files.
        .nest_service("/uploads", ServeDir::new(&state.uploads_dir))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

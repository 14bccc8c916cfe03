use parley_core::{Attachment, Message, MessageDraft};

use super::schemas::{
    ErrorResponse, ExistsResponse, HealthResponse, LoginRequest, LoginResponse, MetricsResponse,
    RegisterRequest,
};

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "Parley Chat API",
        version = "0.1.0",
        description = "HTTP API for the Parley two-party chat system. Register, exchange direct messages with attachments, and stream deliveries in real time.",
        license(name = "Apache-2.0")
    ),
    tags(
        (name = "Health", description = "Service health and metrics"),
        (name = "Auth", description = "Account registration and login"),
        (name = "Users", description = "Recipient validation"),
        (name = "Upload", description = "File attachment upload"),
        (name = "Messages", description = "Message submission and conversation history"),
        (name = "Stream", description = "Real-time delivery stream")
    ),
    paths(
        super::health::health,
        super::health::metrics,
        super::auth::register,
        super::auth::login,
        super::users::exists,
        super::upload::upload,
        super::messages::submit,
        super::messages::all_messages,
        super::messages::history,
        super::stream::stream,
    ),
    components(schemas(
        Message, MessageDraft, Attachment,
        HealthResponse, MetricsResponse,
        RegisterRequest, LoginRequest, LoginResponse,
        ExistsResponse, ErrorResponse,
    ))
)]
pub struct ApiDoc;

//! Parley HTTP Client
//!
//! A native Rust client for the Parley chat server's REST API.
//!
//! # Quick Start
//!
//! ```no_run
//! use parley_client::ParleyClient;
//! use parley_core::MessageDraft;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), parley_client::Error> {
//!     let mut client = ParleyClient::new("http://localhost:8080");
//!
//!     client.register("alice", "alice@example.com", "secret").await?;
//!     client.login("alice@example.com", "secret").await?;
//!
//!     let message = client
//!         .submit(&MessageDraft::text("alice", "bob", "hi"))
//!         .await?;
//!     println!("delivered at {}", message.timestamp);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - Account registration and login
//! - Message submission and conversation history
//! - Multipart attachment upload
//! - Real-time delivery stream over SSE
//! - Builder pattern for advanced configuration

mod error;
pub mod session;
pub mod stream;

pub use error::Error;
pub use session::{Session, SessionError};
pub use stream::{EventStream, SseFrame, StreamItem};

use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;

use parley_core::{Attachment, Message, MessageDraft};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-request timeout for the long-lived SSE stream. Effectively
/// unbounded, but a finite duration so the deadline arithmetic can
/// never overflow.
const STREAM_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// HTTP client for the Parley chat server.
///
/// Holds the Bearer token issued at login; all protected endpoints use
/// it automatically.
#[derive(Debug, Clone)]
pub struct ParleyClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

/// Builder for configuring a [`ParleyClient`].
#[derive(Debug)]
pub struct ParleyClientBuilder {
    base_url: String,
    timeout: Duration,
    token: Option<String>,
    client: Option<Client>,
}

impl ParleyClientBuilder {
    /// Create a new builder with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            token: None,
            client: None,
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a pre-issued Bearer token.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Use a custom reqwest Client.
    ///
    /// Useful for configuring TLS, proxies, or other advanced settings.
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ParleyClient, Error> {
        let client = match self.client {
            Some(c) => c,
            None => Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| Error::Configuration(e.to_string()))?,
        };

        Ok(ParleyClient {
            client,
            base_url: self.base_url,
            token: self.token,
        })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody {
    token: String,
    username: String,
    #[allow(dead_code)]
    expires_in: u64,
}

#[derive(Deserialize)]
struct ExistsBody {
    exists: bool,
}

impl ParleyClient {
    /// Create a new client with default configuration.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use parley_client::ParleyClient;
    ///
    /// let client = ParleyClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        ParleyClientBuilder::new(base_url)
            .build()
            .expect("default client configuration should not fail")
    }

    /// Create a builder for advanced configuration.
    pub fn builder(base_url: impl Into<String>) -> ParleyClientBuilder {
        ParleyClientBuilder::new(base_url)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns `true` if the client holds a Bearer token.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Add the authorization header if a token is held.
    fn add_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.header("Authorization", format!("Bearer {token}")),
            None => req,
        }
    }

    /// Turn non-success responses into [`Error::Http`], pulling the
    /// message out of the server's error body when it has one.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_owned(),
        };
        Err(Error::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, Error> {
        Self::check(response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| Error::Deserialization(e.to_string()))
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Check if the server is healthy.
    pub async fn health(&self) -> Result<bool, Error> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(response.status().is_success())
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Create a new account.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), Error> {
        let url = format!("{}/v1/auth/register", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "username": username,
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    /// Log in with email and password. Stores the issued Bearer token
    /// for subsequent requests and returns the account's username.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<String, Error> {
        let url = format!("{}/v1/auth/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        let body: LoginBody = Self::read_json(response).await?;
        self.token = Some(body.token);
        Ok(body.username)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Check whether a username belongs to a registered user.
    pub async fn peer_exists(&self, username: &str) -> Result<bool, Error> {
        let url = format!("{}/v1/users/{username}/exists", self.base_url);
        let response = self
            .add_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        let body: ExistsBody = Self::read_json(response).await?;
        Ok(body.exists)
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Submit a message through the delivery pipeline. Returns the
    /// persisted record, with the store-assigned id and timestamp.
    pub async fn submit(&self, draft: &MessageDraft) -> Result<Message, Error> {
        let url = format!("{}/v1/messages", self.base_url);
        let response = self
            .add_auth(self.client.post(&url))
            .json(draft)
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Self::read_json(response).await
    }

    /// Fetch every message involving the authenticated user, across all
    /// conversations, in store order. The raw input for client-side
    /// conversation assembly; used to rebuild local state after a
    /// lagged stream.
    pub async fn fetch_all_messages(&self) -> Result<Vec<Message>, Error> {
        let url = format!("{}/v1/messages", self.base_url);
        let response = self
            .add_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Self::read_json(response).await
    }

    /// Fetch the conversation with `peer`, oldest first, optionally
    /// narrowed by a case-insensitive text filter.
    pub async fn fetch_messages(
        &self,
        peer: &str,
        filter: Option<&str>,
    ) -> Result<Vec<Message>, Error> {
        let url = format!("{}/v1/messages/{peer}", self.base_url);
        let mut request = self.add_auth(self.client.get(&url));
        if let Some(filter) = filter {
            request = request.query(&[("filter", filter)]);
        }
        let response = request
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Self::read_json(response).await
    }

    // =========================================================================
    // Upload
    // =========================================================================

    /// Upload a file attachment. Returns the descriptor to embed in a
    /// message draft.
    pub async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<Attachment, Error> {
        let part = reqwest::multipart::Part::bytes(data.to_vec())
            .file_name(filename.to_owned())
            .mime_str(content_type)
            .map_err(|e| Error::Configuration(format!("invalid content type: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = format!("{}/v1/upload", self.base_url);
        let response = self
            .add_auth(self.client.post(&url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Self::read_json(response).await
    }

    // =========================================================================
    // Stream
    // =========================================================================

    /// Open the real-time SSE delivery stream.
    ///
    /// The returned stream yields message deliveries as they happen,
    /// plus lagged notices when this client falls behind. No request
    /// timeout is applied; the stream stays open until dropped.
    pub async fn stream(&self) -> Result<EventStream, Error> {
        let url = format!("{}/v1/stream", self.base_url);
        let response = self
            .add_auth(self.client.get(&url))
            .timeout(STREAM_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        let response = Self::check(response).await?;
        Ok(stream::event_stream_from_response(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_trims_trailing_slash() {
        let client = ParleyClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn stream_timeout_dwarfs_the_default() {
        // The stream request must outlive any realistic connection
        // without relying on overflow-prone sentinel durations.
        assert!(STREAM_TIMEOUT >= DEFAULT_TIMEOUT * 1000);
    }

    #[test]
    fn builder_token_marks_authenticated() {
        let client = ParleyClient::builder("http://localhost:8080")
            .token("abc")
            .build()
            .unwrap();
        assert!(client.is_authenticated());

        let client = ParleyClient::new("http://localhost:8080");
        assert!(!client.is_authenticated());
    }
}

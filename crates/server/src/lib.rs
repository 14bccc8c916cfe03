//! Standalone HTTP server for the Parley chat system.
//!
//! Wires the delivery broker, message store, blob store, and auth
//! provider into an Axum application. The binary entry point lives in
//! `main.rs`; everything here is also usable as a library for tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod store_factory;

pub use config::ParleyConfig;
pub use error::ServerError;

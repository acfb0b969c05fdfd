//! Library crate for league-back, exposing modules for binaries and integration tests.

/// Credential verification and request authentication.
pub mod auth;
/// Runtime configuration.
pub mod config;
/// Persistence layer: entities, the store trait and its backends.
pub mod dao;
mod dto;
mod error;
/// HTTP routing.
pub mod routes;
/// Domain services behind the routes.
pub mod services;
/// Shared application state.
pub mod state;

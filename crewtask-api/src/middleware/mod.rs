/// Middleware modules for the API server
///
/// This module contains custom middleware for:
/// - Security headers
///
/// Session authentication is a router layer in `app.rs`, built on the
/// shared auth types.

pub mod security;

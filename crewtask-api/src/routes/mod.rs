/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, logout)
/// - `users`: User directory
/// - `teams`: Team CRUD and membership management
/// - `tasks`: Task CRUD

use serde::{Deserialize, Serialize};

pub mod auth;
pub mod health;
pub mod tasks;
pub mod teams;
pub mod users;

/// Plain message response for operations with nothing else to return
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome message
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

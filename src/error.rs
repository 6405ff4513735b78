// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.

/// Application error type shared by all components.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired credential")]
    InvalidCredential,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Backend API error: {0}")]
    Api(String),

    #[error("Malformed response envelope: {0}")]
    Envelope(String),

    #[error("Streaming channel error: {0}")]
    Channel(String),

    #[error("Credential store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for failures that mean the credential is no longer usable,
    /// which must force a logout rather than a retry.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, AppError::Unauthorized | AppError::InvalidCredential)
    }
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, AppError>;

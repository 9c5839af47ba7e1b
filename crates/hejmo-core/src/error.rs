// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Hejmo marketplace client core.

use thiserror::Error;

/// The primary error type used across all Hejmo collaborator traits and core operations.
#[derive(Debug, Error)]
pub enum HejmoError {
    /// Authentication errors (bad credential, duplicate registration).
    #[error("authentication error: {message}")]
    Auth {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Remote store errors (network or permission failure on read/write/upload/subscribe).
    #[error("store error: {message}")]
    Store {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Local cache errors (serialization or I/O failure). Always non-fatal:
    /// callers log and continue, the cache is advisory.
    #[error("cache error: {source}")]
    Cache {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A point read or detail lookup missed.
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HejmoError {
    /// Shorthand for an `Auth` error without an underlying source.
    pub fn auth(message: impl Into<String>) -> Self {
        HejmoError::Auth {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a `Store` error without an underlying source.
    pub fn store(message: impl Into<String>) -> Self {
        HejmoError::Store {
            message: message.into(),
            source: None,
        }
    }

    /// True if this error is a point-read miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, HejmoError::NotFound { .. })
    }
}

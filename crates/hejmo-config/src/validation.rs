// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and known log levels.

use crate::diagnostic::ConfigError;
use crate::model::HejmoConfig;

const KNOWN_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &HejmoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !KNOWN_LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level `{}` is not one of {}",
                config.app.log_level,
                KNOWN_LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.cache.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "cache.database_path must not be empty".to_string(),
        });
    }

    if config.remote.listings_collection.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "remote.listings_collection must not be empty".to_string(),
        });
    }

    if config.remote.users_collection.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "remote.users_collection must not be empty".to_string(),
        });
    }

    if config.remote.blob_prefix.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "remote.blob_prefix must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Hejmo marketplace client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Hejmo configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HejmoConfig {
    /// Application identity and logging settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Local cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Remote store settings.
    #[serde(default)]
    pub remote: RemoteConfig,
}

/// Application identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name of the client instance.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

/// Local cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Path to the SQLite cache database. The special value `:memory:`
    /// opens a non-durable in-memory cache.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            database_path: default_database_path(),
        }
    }
}

/// Remote store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    /// Backend project identifier, if the backend requires one.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Collection holding listing documents.
    #[serde(default = "default_listings_collection")]
    pub listings_collection: String,

    /// Collection holding user profile documents.
    #[serde(default = "default_users_collection")]
    pub users_collection: String,

    /// Blob path prefix for listing images.
    #[serde(default = "default_blob_prefix")]
    pub blob_prefix: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            project_id: None,
            listings_collection: default_listings_collection(),
            users_collection: default_users_collection(),
            blob_prefix: default_blob_prefix(),
        }
    }
}

fn default_app_name() -> String {
    "hejmo".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("hejmo/cache.db").display().to_string())
        .unwrap_or_else(|| "hejmo-cache.db".to_string())
}

fn default_listings_collection() -> String {
    "listings".to_string()
}

fn default_users_collection() -> String {
    "users".to_string()
}

fn default_blob_prefix() -> String {
    "listings".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_populated() {
        let config = HejmoConfig::default();
        assert_eq!(config.app.name, "hejmo");
        assert_eq!(config.app.log_level, "info");
        assert_eq!(config.remote.listings_collection, "listings");
        assert_eq!(config.remote.users_collection, "users");
        assert_eq!(config.remote.blob_prefix, "listings");
        assert!(config.remote.project_id.is_none());
        assert!(!config.cache.database_path.is_empty());
    }
}

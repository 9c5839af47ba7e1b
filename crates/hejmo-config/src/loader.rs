// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./hejmo.toml` > `~/.config/hejmo/hejmo.toml` >
//! `/etc/hejmo/hejmo.toml` with environment variable overrides via `HEJMO_`
//! prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::HejmoConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/hejmo/hejmo.toml` (system-wide)
/// 3. `~/.config/hejmo/hejmo.toml` (user XDG config)
/// 4. `./hejmo.toml` (local directory)
/// 5. `HEJMO_*` environment variables
pub fn load_config() -> Result<HejmoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HejmoConfig::default()))
        .merge(Toml::file("/etc/hejmo/hejmo.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("hejmo/hejmo.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("hejmo.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<HejmoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HejmoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HejmoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HejmoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `HEJMO_CACHE_DATABASE_PATH` must map to
/// `cache.database_path`, not `cache.database.path`.
fn env_provider() -> Env {
    Env::prefixed("HEJMO_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: HEJMO_CACHE_DATABASE_PATH -> "cache_database_path"
        let mapped = key
            .as_str()
            .replacen("app_", "app.", 1)
            .replacen("cache_", "cache.", 1)
            .replacen("remote_", "remote.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.app.name, "hejmo");
        assert_eq!(config.remote.listings_collection, "listings");
    }

    #[test]
    fn toml_sections_override_defaults() {
        let config = load_config_from_str(
            r#"
[app]
log_level = "debug"

[remote]
listings_collection = "properties"
"#,
        )
        .unwrap();
        assert_eq!(config.app.log_level, "debug");
        assert_eq!(config.remote.listings_collection, "properties");
        // Untouched sections keep their defaults.
        assert_eq!(config.remote.users_collection, "users");
    }
}

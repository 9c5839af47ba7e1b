// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hejmo - the headless core of a two-role property-listing marketplace
//! client.
//!
//! This crate is the application root: it loads configuration, opens the
//! local cache, and wires the remote store and navigator collaborators into
//! an owned [`App`] carrying the session controller and listing sync layer.
//! The presentation layer (screens, image picking, routing) composes on top
//! of the `App` handle; nothing here is global state.

use std::sync::Arc;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use hejmo_cache::SqliteCache;
use hejmo_config::HejmoConfig;
use hejmo_core::{HejmoError, Navigator, RemoteStore};
use hejmo_session::SessionController;
use hejmo_sync::ListingSync;

/// The composed application core, owned by the application root scope.
///
/// Holds exactly one [`SessionController`] (and therefore one session) for
/// the process lifetime. Dropping the `App` stops the session event loop.
pub struct App {
    config: HejmoConfig,
    session: SessionController,
    listings: ListingSync,
}

impl App {
    /// Open the local cache and wire the collaborators into a running core.
    pub async fn build(
        config: HejmoConfig,
        store: Arc<dyn RemoteStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, HejmoError> {
        let cache = Arc::new(SqliteCache::open(&config.cache.database_path).await?);

        let session = SessionController::start(
            Arc::clone(&store),
            navigator,
            config.remote.users_collection.clone(),
        );
        let listings = ListingSync::new(
            store,
            cache,
            config.remote.listings_collection.clone(),
            config.remote.blob_prefix.clone(),
        );

        debug!(name = %config.app.name, "application core wired");
        Ok(App {
            config,
            session,
            listings,
        })
    }

    pub fn config(&self) -> &HejmoConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn listings(&self) -> &ListingSync {
        &self.listings
    }
}

/// Install the global tracing subscriber honoring `app.log_level`.
///
/// `RUST_LOG` takes precedence when set. Safe to call more than once; later
/// calls are no-ops.
pub fn init_tracing(config: &HejmoConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.app.log_level.clone()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

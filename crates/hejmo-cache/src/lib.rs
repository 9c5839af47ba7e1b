// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Hejmo advisory local cache.
//!
//! Implements the `hejmo-core` `LocalCache` trait over a single WAL-mode
//! SQLite connection. The cache stores serialized document snapshots keyed
//! by entity id; entries survive process restarts and have no expiry policy
//! beyond explicit overwrite.

pub mod sqlite;

pub use sqlite::SqliteCache;

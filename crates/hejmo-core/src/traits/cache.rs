// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local cache trait for the advisory per-device key-value store.

use async_trait::async_trait;

use crate::error::HejmoError;

/// Durable per-device key-value store of serialized documents.
///
/// Entries are advisory: they may be stale relative to the remote store and
/// are never treated as the source of truth once a live subscription is
/// active for the same id. `set` failures are non-fatal; callers log and
/// continue.
#[async_trait]
pub trait LocalCache: Send + Sync + 'static {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, HejmoError>;

    /// Store `value` under `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), HejmoError>;
}

// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions for the Hejmo core.
//!
//! The remote store, local cache, and navigator are consumed through these
//! seams only. Async traits use `#[async_trait]` for dynamic dispatch
//! compatibility.

pub mod cache;
pub mod navigator;
pub mod remote_store;

// Re-export all traits at the traits module level for convenience.
pub use cache::LocalCache;
pub use navigator::Navigator;
pub use remote_store::{
    CredentialEvent, Document, FieldFilter, QueryHandle, QueryOptions, RemoteStore,
};

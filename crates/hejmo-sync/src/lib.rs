// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Real-time listing synchronization for the Hejmo marketplace client.
//!
//! Wraps the remote store's live queries in normalized, observable listing
//! feeds, serves single-listing reads through the advisory local cache, and
//! implements listing publication (image blob upload + document write).

pub mod feed;
pub mod keys;
pub mod listings;
pub mod query;

pub use feed::ListingFeed;
pub use listings::{ListingDraft, ListingPatch, ListingSync};
pub use query::ListingQuery;

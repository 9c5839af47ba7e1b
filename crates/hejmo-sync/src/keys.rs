// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache key scheme for listing snapshots.

use hejmo_core::ListingId;

/// Bulk key holding the sequence of listings created by this device.
/// Write-through append audit trail; never read back into the UI.
pub const LISTINGS_KEY: &str = "listings";

/// Cache key for a single listing snapshot.
pub fn listing_key(id: &ListingId) -> String {
    format!("listing:{}", id.0)
}

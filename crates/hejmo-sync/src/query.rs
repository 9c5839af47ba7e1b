// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Listing query parameters and document normalization.

use serde_json::Value;
use tracing::warn;

use hejmo_core::{Document, FieldFilter, Listing, QueryOptions, UserId};

/// Parameters of a listing feed subscription.
///
/// A subscription is identified by this tuple: two feeds with equal
/// parameters observe the same result sets. Absent both knobs, the feed is
/// the unfiltered, insertion-ordered set of all listings; callers requiring
/// deterministic order must set `order_by`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingQuery {
    order_by: Option<String>,
    filter: Option<(String, Value)>,
}

impl ListingQuery {
    /// All listings, unfiltered.
    pub fn all() -> Self {
        Self::default()
    }

    /// Sort ascending by `field`.
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    /// Restrict to listings where `field` equals `value` exactly.
    pub fn filter(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filter = Some((field.into(), value));
        self
    }

    /// A realtor's own listings, in creation order.
    pub fn owned_by(owner: &UserId) -> Self {
        Self::all()
            .filter("ownerId", Value::String(owner.0.clone()))
            .order_by("createdAt")
    }

    pub(crate) fn to_options(&self) -> QueryOptions {
        QueryOptions {
            order_by: self.order_by.clone(),
            filter: self
                .filter
                .as_ref()
                .map(|(field, value)| FieldFilter {
                    field: field.clone(),
                    value: value.clone(),
                }),
        }
    }
}

/// Normalize a raw document into a [`Listing`] by injecting the document key
/// as the `id` field.
pub(crate) fn listing_from_document(doc: &Document) -> Result<Listing, serde_json::Error> {
    let mut fields = doc.fields.clone();
    if let Value::Object(map) = &mut fields {
        map.insert("id".to_string(), Value::String(doc.id.clone()));
    }
    serde_json::from_value(fields)
}

/// Normalize a full snapshot, skipping documents that fail to deserialize.
/// A malformed document must never poison the feed.
pub(crate) fn normalize_snapshot(docs: &[Document]) -> Vec<Listing> {
    docs.iter()
        .filter_map(|doc| match listing_from_document(doc) {
            Ok(listing) => Some(listing),
            Err(e) => {
                warn!(id = %doc.id, error = %e, "skipping malformed listing document");
                None
            }
        })
        .collect()
}

// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Hejmo marketplace client.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Hejmo workspace. The session, sync, and
//! cache layers all compose against the collaborator seams defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::HejmoError;
pub use types::{Listing, ListingId, Role, Route, Session, SessionStatus, UserId, UserProfile};

// Re-export all collaborator traits at crate root.
pub use traits::{
    CredentialEvent, Document, FieldFilter, LocalCache, Navigator, QueryHandle, QueryOptions,
    RemoteStore,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_options_default_is_unfiltered_and_unordered() {
        let options = QueryOptions::default();
        assert!(options.order_by.is_none());
        assert!(options.filter.is_none());
    }

    #[test]
    fn query_options_identify_a_subscription() {
        // Subscriptions are identified by the parameter tuple; equality is
        // what teardown-then-resubscribe tests hinge on.
        let a = QueryOptions {
            order_by: Some("createdAt".into()),
            filter: Some(FieldFilter {
                field: "ownerId".into(),
                value: serde_json::json!("u-1"),
            }),
        };
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn collaborator_traits_are_object_safe() {
        // The app wires adapters as trait objects; this won't compile if a
        // trait loses object safety.
        fn _remote(_: &dyn RemoteStore) {}
        fn _cache(_: &dyn LocalCache) {}
        fn _nav(_: &dyn Navigator) {}
    }
}

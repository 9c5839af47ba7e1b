// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types used across collaborator traits and the Hejmo core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for an authenticated user (the remote store's identity handle).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Unique identifier for a listing document, assigned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingId(pub String);

/// The role a user picked at registration, stored on their profile document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Realtor,
}

/// Lifecycle status of the device-wide session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Initial state: the credential listener has not fired yet.
    Resolving,
    /// No credential present.
    Unauthenticated,
    /// Credential present but no resolved role (profile missing, role
    /// unrecognized, or profile lookup failed).
    AuthenticatedNoRole,
    /// Credential present and role resolved.
    Authenticated,
}

/// The resolved identity, role, and lifecycle status for the current device.
///
/// Invariant: `role` is `Some` if and only if `status` is
/// [`SessionStatus::Authenticated`]. Construct through the associated
/// functions to preserve it.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub credential: Option<UserId>,
    pub role: Option<Role>,
    pub status: SessionStatus,
}

impl Session {
    /// The initial session, before the credential listener has fired.
    pub fn resolving() -> Self {
        Session {
            credential: None,
            role: None,
            status: SessionStatus::Resolving,
        }
    }

    /// No credential present.
    pub fn unauthenticated() -> Self {
        Session {
            credential: None,
            role: None,
            status: SessionStatus::Unauthenticated,
        }
    }

    /// Credential present with a resolved role.
    pub fn authenticated(credential: UserId, role: Role) -> Self {
        Session {
            credential: Some(credential),
            role: Some(role),
            status: SessionStatus::Authenticated,
        }
    }

    /// Credential present but role resolution did not produce a role.
    pub fn authenticated_no_role(credential: UserId) -> Self {
        Session {
            credential: Some(credential),
            role: None,
            status: SessionStatus::AuthenticatedNoRole,
        }
    }
}

/// A property listing as stored in the `listings` collection.
///
/// Field names follow the remote document wire format (camelCase). The `id`
/// is the document key and is injected during normalization, not stored in
/// the document fields themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub description: String,
    pub area_size: String,
    pub rooms: u32,
    pub price: f64,
    /// May be empty until the image upload completes.
    pub image_url: String,
    pub owner_id: UserId,
    /// Immutable after creation; defines default display ordering.
    pub created_at: DateTime<Utc>,
}

/// A user profile document in the `users` collection, keyed by identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub role: Option<Role>,
    pub email: String,
}

/// Opaque route intents handed to the navigation collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum Route {
    #[strum(serialize = "sign-in")]
    SignIn,
    #[strum(serialize = "realtor-home")]
    RealtorHome,
    #[strum(serialize = "customer-home")]
    CustomerHome,
}

// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote store trait: the authoritative document database, credential
//! service, and blob storage consumed by the core.
//!
//! All listener-style APIs hand back owned channel receivers or handles.
//! Dropping the handle is the unsubscribe: implementations must stop
//! delivering into a dropped consumer.

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::DropGuard;

use crate::error::HejmoError;
use crate::types::UserId;

/// One emission from the credential-state stream: the current credential,
/// or `None` after sign-out / when no user is signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialEvent {
    pub credential: Option<UserId>,
}

/// A document as delivered inside a query snapshot: the store-assigned key
/// plus the stored fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Value,
}

/// An exact-match equality restriction on a single document field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

/// Parameters of a live query. A subscription is identified by this tuple.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryOptions {
    /// Sort ascending by this field. Absent: insertion order, otherwise
    /// undefined.
    pub order_by: Option<String>,
    /// Restrict to documents where `field == value`.
    pub filter: Option<FieldFilter>,
}

/// A live query subscription handle.
///
/// `snapshots` delivers the **complete current result set** on every change,
/// never a delta. `errors` is a separate channel: a subscription error does
/// not terminate the snapshot sequence. Dropping the handle releases the
/// remote listener via the contained guard.
pub struct QueryHandle {
    pub snapshots: mpsc::Receiver<Vec<Document>>,
    pub errors: mpsc::Receiver<HejmoError>,
    /// Cancels the producing listener when the handle is dropped.
    pub guard: DropGuard,
}

/// The remote document store, credential service, and blob store.
///
/// Consumed through this seam only; the core never talks to a concrete
/// backend directly.
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    /// Subscribe to credential-state changes. The store pushes the current
    /// credential (or absence) whenever it changes; at most one notification
    /// is in flight at a time. Dropping the receiver unsubscribes.
    fn subscribe_credential(&self) -> mpsc::Receiver<CredentialEvent>;

    /// Verify an email/password credential, returning the identity on success.
    async fn verify_credential(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<UserId, HejmoError>;

    /// Create a new credential, returning the new identity. Fails on
    /// duplicate email.
    async fn create_credential(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<UserId, HejmoError>;

    /// Invalidate the current credential (sign out).
    async fn invalidate_credential(&self) -> Result<(), HejmoError>;

    /// Allocate a fresh document id in `collection` without writing anything.
    /// Used when a blob path must embed the id before the document exists.
    fn allocate_document_id(&self, collection: &str) -> String;

    /// Point read. `Ok(None)` is a miss, not an error.
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Value>, HejmoError>;

    /// Full document write (create or replace).
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<(), HejmoError>;

    /// Shallow merge into an existing document: only the provided fields are
    /// touched.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<(), HejmoError>;

    /// Open a live query. The first snapshot reflects the current result set;
    /// every subsequent change re-delivers the full set.
    async fn subscribe_query(
        &self,
        collection: &str,
        options: QueryOptions,
    ) -> Result<QueryHandle, HejmoError>;

    /// Upload a blob at `path`, replacing any existing content.
    async fn upload_blob(&self, path: &str, bytes: Vec<u8>) -> Result<(), HejmoError>;

    /// Resolve the public URL for a previously uploaded blob.
    async fn get_blob_url(&self, path: &str) -> Result<String, HejmoError>;
}

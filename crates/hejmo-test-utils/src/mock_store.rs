// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock remote store for deterministic testing.
//!
//! `MockRemoteStore` implements `RemoteStore` with in-memory collections,
//! a scriptable credential service, and live query re-emission on every
//! write. Credential operations behave like the real backend: creating or
//! verifying a credential signs the device in and pushes a credential event;
//! invalidating pushes an absence event.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use hejmo_core::{
    CredentialEvent, Document, HejmoError, QueryHandle, QueryOptions, RemoteStore, UserId,
};

struct StoredCredential {
    password: String,
    uid: UserId,
}

struct QuerySub {
    collection: String,
    options: QueryOptions,
    snapshots: mpsc::Sender<Vec<Document>>,
    errors: mpsc::Sender<HejmoError>,
    token: CancellationToken,
}

#[derive(Default)]
struct Inner {
    credentials: HashMap<String, StoredCredential>,
    current: Option<UserId>,
    /// Collection -> insertion-ordered (id, fields) pairs.
    collections: HashMap<String, Vec<(String, Value)>>,
    blobs: HashMap<String, Vec<u8>>,
    credential_subs: Vec<mpsc::Sender<CredentialEvent>>,
    query_subs: Vec<QuerySub>,
    point_reads: HashMap<String, usize>,
    failing_collections: HashSet<String>,
    failing_reads: HashSet<String>,
    id_counter: u64,
}

/// An in-memory mock of the remote document store, credential service, and
/// blob store.
pub struct MockRemoteStore {
    inner: Arc<Mutex<Inner>>,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        MockRemoteStore {
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Insert (or replace) a document directly, as if another device wrote
    /// it, and re-emit snapshots to matching live queries.
    pub async fn insert_document(&self, collection: &str, id: &str, fields: Value) {
        {
            let mut inner = self.inner.lock().unwrap();
            upsert(&mut inner, collection, id, fields);
        }
        self.emit_query_snapshots(collection).await;
    }

    /// Remove a document directly and re-emit snapshots to matching live
    /// queries.
    pub async fn remove_document(&self, collection: &str, id: &str) {
        {
            let mut inner = self.inner.lock().unwrap();
            if let Some(docs) = inner.collections.get_mut(collection) {
                docs.retain(|(doc_id, _)| doc_id != id);
            }
        }
        self.emit_query_snapshots(collection).await;
    }

    /// Number of point reads (`get_document`) served for `collection`.
    pub fn point_reads(&self, collection: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .point_reads
            .get(collection)
            .copied()
            .unwrap_or(0)
    }

    /// While enabled, `set_document` and `update_document` against
    /// `collection` fail with a store error.
    pub fn fail_writes(&self, collection: &str, enabled: bool) {
        let mut inner = self.inner.lock().unwrap();
        if enabled {
            inner.failing_collections.insert(collection.to_string());
        } else {
            inner.failing_collections.remove(collection);
        }
    }

    /// While enabled, `get_document` against `collection` fails with a store
    /// error.
    pub fn fail_reads(&self, collection: &str, enabled: bool) {
        let mut inner = self.inner.lock().unwrap();
        if enabled {
            inner.failing_reads.insert(collection.to_string());
        } else {
            inner.failing_reads.remove(collection);
        }
    }

    /// Push a store error onto the error channel of every live query against
    /// `collection`. The snapshot channels stay open.
    pub async fn inject_query_error(&self, collection: &str, message: &str) {
        let targets: Vec<mpsc::Sender<HejmoError>> = {
            let mut inner = self.inner.lock().unwrap();
            inner.query_subs.retain(|s| !s.token.is_cancelled());
            inner
                .query_subs
                .iter()
                .filter(|s| s.collection == collection)
                .map(|s| s.errors.clone())
                .collect()
        };
        for tx in targets {
            let _ = tx.send(HejmoError::store(message)).await;
        }
    }

    /// Count of live (not torn down) query listeners for `collection`.
    pub fn active_queries(&self, collection: &str) -> usize {
        let mut inner = self.inner.lock().unwrap();
        inner.query_subs.retain(|s| !s.token.is_cancelled());
        inner
            .query_subs
            .iter()
            .filter(|s| s.collection == collection)
            .count()
    }

    /// The raw bytes uploaded at `path`, if any.
    pub fn blob_bytes(&self, path: &str) -> Option<Vec<u8>> {
        self.inner.lock().unwrap().blobs.get(path).cloned()
    }

    /// The stored fields of `collection/id`, bypassing read counters.
    pub fn document_fields(&self, collection: &str, id: &str) -> Option<Value> {
        let inner = self.inner.lock().unwrap();
        inner.collections.get(collection).and_then(|docs| {
            docs.iter()
                .find(|(doc_id, _)| doc_id == id)
                .map(|(_, fields)| fields.clone())
        })
    }

    async fn emit_credential(&self, event: CredentialEvent) {
        let senders: Vec<mpsc::Sender<CredentialEvent>> = {
            let inner = self.inner.lock().unwrap();
            inner.credential_subs.to_vec()
        };
        for tx in senders {
            let _ = tx.send(event.clone()).await;
        }
    }

    async fn emit_query_snapshots(&self, collection: &str) {
        let targets: Vec<(mpsc::Sender<Vec<Document>>, Vec<Document>)> = {
            let mut inner = self.inner.lock().unwrap();
            inner.query_subs.retain(|s| !s.token.is_cancelled());
            let docs = inner
                .collections
                .get(collection)
                .cloned()
                .unwrap_or_default();
            inner
                .query_subs
                .iter()
                .filter(|s| s.collection == collection)
                .map(|s| (s.snapshots.clone(), evaluate_query(&docs, &s.options)))
                .collect()
        };
        for (tx, snapshot) in targets {
            let _ = tx.send(snapshot).await;
        }
    }
}

impl Default for MockRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    fn subscribe_credential(&self) -> mpsc::Receiver<CredentialEvent> {
        let (tx, rx) = mpsc::channel(32);
        let mut inner = self.inner.lock().unwrap();
        // Like the real backend, the listener immediately observes the
        // current credential state.
        let _ = tx.try_send(CredentialEvent {
            credential: inner.current.clone(),
        });
        inner.credential_subs.push(tx);
        rx
    }

    async fn verify_credential(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<UserId, HejmoError> {
        let uid = {
            let mut inner = self.inner.lock().unwrap();
            let stored = inner
                .credentials
                .get(email)
                .filter(|c| c.password == password.expose_secret())
                .map(|c| c.uid.clone())
                .ok_or_else(|| HejmoError::auth(format!("invalid credential for {email}")))?;
            inner.current = Some(stored.clone());
            stored
        };
        self.emit_credential(CredentialEvent {
            credential: Some(uid.clone()),
        })
        .await;
        Ok(uid)
    }

    async fn create_credential(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<UserId, HejmoError> {
        let uid = {
            let mut inner = self.inner.lock().unwrap();
            if inner.credentials.contains_key(email) {
                return Err(HejmoError::auth(format!("email already registered: {email}")));
            }
            inner.id_counter += 1;
            let uid = UserId(format!("user-{}", inner.id_counter));
            inner.credentials.insert(
                email.to_string(),
                StoredCredential {
                    password: password.expose_secret().to_string(),
                    uid: uid.clone(),
                },
            );
            // Creating a credential signs the device in.
            inner.current = Some(uid.clone());
            uid
        };
        self.emit_credential(CredentialEvent {
            credential: Some(uid.clone()),
        })
        .await;
        Ok(uid)
    }

    async fn invalidate_credential(&self) -> Result<(), HejmoError> {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.current = None;
        }
        self.emit_credential(CredentialEvent { credential: None })
            .await;
        Ok(())
    }

    fn allocate_document_id(&self, collection: &str) -> String {
        let mut inner = self.inner.lock().unwrap();
        inner.id_counter += 1;
        format!("{}-{}", collection, inner.id_counter)
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Value>, HejmoError> {
        let mut inner = self.inner.lock().unwrap();
        *inner.point_reads.entry(collection.to_string()).or_insert(0) += 1;
        if inner.failing_reads.contains(collection) {
            return Err(HejmoError::store(format!(
                "read of {collection}/{id} rejected"
            )));
        }
        Ok(inner.collections.get(collection).and_then(|docs| {
            docs.iter()
                .find(|(doc_id, _)| doc_id == id)
                .map(|(_, fields)| fields.clone())
        }))
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<(), HejmoError> {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.failing_collections.contains(collection) {
                return Err(HejmoError::store(format!(
                    "write to {collection}/{id} rejected"
                )));
            }
            upsert(&mut inner, collection, id, fields);
        }
        self.emit_query_snapshots(collection).await;
        Ok(())
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<(), HejmoError> {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.failing_collections.contains(collection) {
                return Err(HejmoError::store(format!(
                    "update of {collection}/{id} rejected"
                )));
            }
            let existing = inner
                .collections
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|(doc_id, _)| doc_id == id));
            let Some((_, stored)) = existing else {
                return Err(HejmoError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                });
            };
            merge_shallow(stored, fields);
        }
        self.emit_query_snapshots(collection).await;
        Ok(())
    }

    async fn subscribe_query(
        &self,
        collection: &str,
        options: QueryOptions,
    ) -> Result<QueryHandle, HejmoError> {
        let (snap_tx, snap_rx) = mpsc::channel(32);
        let (err_tx, err_rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        let guard = token.clone().drop_guard();

        let initial = {
            let mut inner = self.inner.lock().unwrap();
            let docs = inner
                .collections
                .get(collection)
                .cloned()
                .unwrap_or_default();
            let initial = evaluate_query(&docs, &options);
            inner.query_subs.push(QuerySub {
                collection: collection.to_string(),
                options,
                snapshots: snap_tx.clone(),
                errors: err_tx,
                token,
            });
            initial
        };
        // The first snapshot reflects the current result set.
        let _ = snap_tx.send(initial).await;

        Ok(QueryHandle {
            snapshots: snap_rx,
            errors: err_rx,
            guard,
        })
    }

    async fn upload_blob(&self, path: &str, bytes: Vec<u8>) -> Result<(), HejmoError> {
        self.inner
            .lock()
            .unwrap()
            .blobs
            .insert(path.to_string(), bytes);
        Ok(())
    }

    async fn get_blob_url(&self, path: &str) -> Result<String, HejmoError> {
        let inner = self.inner.lock().unwrap();
        if !inner.blobs.contains_key(path) {
            return Err(HejmoError::store(format!("no blob uploaded at {path}")));
        }
        Ok(format!("mock://blobs/{path}"))
    }
}

fn upsert(inner: &mut Inner, collection: &str, id: &str, fields: Value) {
    let docs = inner.collections.entry(collection.to_string()).or_default();
    match docs.iter_mut().find(|(doc_id, _)| doc_id == id) {
        Some((_, stored)) => *stored = fields,
        None => docs.push((id.to_string(), fields)),
    }
}

/// Shallow merge: each top-level field of `patch` replaces the stored field.
fn merge_shallow(stored: &mut Value, patch: Value) {
    if let (Value::Object(stored), Value::Object(patch)) = (stored, patch) {
        for (key, value) in patch {
            stored.insert(key, value);
        }
    }
}

/// Apply filter-then-order query semantics over insertion-ordered documents.
fn evaluate_query(docs: &[(String, Value)], options: &QueryOptions) -> Vec<Document> {
    let mut result: Vec<Document> = docs
        .iter()
        .filter(|(_, fields)| match &options.filter {
            Some(filter) => fields.get(&filter.field) == Some(&filter.value),
            None => true,
        })
        .map(|(id, fields)| Document {
            id: id.clone(),
            fields: fields.clone(),
        })
        .collect();

    if let Some(order_by) = &options.order_by {
        // Stable: equal keys keep insertion order.
        result.sort_by(|a, b| compare_fields(a.fields.get(order_by), b.fields.get(order_by)));
    }
    result
}

fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => compare_values(x, y),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

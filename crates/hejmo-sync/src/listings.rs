// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ListingSync`: live feeds, the cache-first detail read, and listing
//! publication.
//!
//! The detail path deliberately trades staleness for perceived latency: a
//! cache hit returns without touching the remote store, and nothing in the
//! live-query path invalidates a previously cached detail entry.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, warn};

use hejmo_core::{HejmoError, Listing, ListingId, LocalCache, RemoteStore, UserId};

use crate::feed::ListingFeed;
use crate::keys;
use crate::query::{listing_from_document, ListingQuery};

/// Fields supplied by the user when publishing a new listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub description: String,
    pub area_size: String,
    pub rooms: u32,
    pub price: f64,
}

/// A partial edit to an existing listing. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingPatch {
    pub description: Option<String>,
    pub area_size: Option<String>,
    pub rooms: Option<u32>,
    pub price: Option<f64>,
}

/// Wraps live queries against the remote `listings` collection and serves
/// single-document reads through the advisory local cache.
pub struct ListingSync {
    store: Arc<dyn RemoteStore>,
    cache: Arc<dyn LocalCache>,
    collection: String,
    blob_prefix: String,
}

impl ListingSync {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        cache: Arc<dyn LocalCache>,
        collection: impl Into<String>,
        blob_prefix: impl Into<String>,
    ) -> Self {
        ListingSync {
            store,
            cache,
            collection: collection.into(),
            blob_prefix: blob_prefix.into(),
        }
    }

    /// Open a live feed for `query`.
    ///
    /// Re-subscribing with equal parameters after a prior teardown starts a
    /// fresh remote listener and observes the same sequence a continuous
    /// subscription would.
    pub async fn subscribe(&self, query: &ListingQuery) -> Result<ListingFeed, HejmoError> {
        let handle = self
            .store
            .subscribe_query(&self.collection, query.to_options())
            .await?;
        debug!(query = ?query, "listing feed opened");
        Ok(ListingFeed::spawn(handle))
    }

    /// Single-listing read outside the live-query mechanism: cache first,
    /// remote on miss, repopulating the cache on a successful remote fetch.
    pub async fn detail(&self, id: &ListingId) -> Result<Listing, HejmoError> {
        let key = keys::listing_key(id);

        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Listing>(&raw) {
                Ok(listing) => return Ok(listing),
                Err(e) => {
                    warn!(id = %id.0, error = %e, "cached listing unreadable, reading remote");
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(id = %id.0, error = %e, "cache read failed, reading remote");
            }
        }

        let fields = self
            .store
            .get_document(&self.collection, &id.0)
            .await?
            .ok_or_else(|| HejmoError::NotFound {
                collection: self.collection.clone(),
                id: id.0.clone(),
            })?;

        let listing = listing_from_document(&hejmo_core::Document {
            id: id.0.clone(),
            fields,
        })
        .map_err(|e| HejmoError::Store {
            message: format!("malformed listing document {}", id.0),
            source: Some(Box::new(e)),
        })?;

        match serde_json::to_string(&listing) {
            Ok(raw) => {
                if let Err(e) = self.cache.set(&key, &raw).await {
                    warn!(id = %id.0, error = %e, "caching fetched listing failed");
                }
            }
            Err(e) => warn!(id = %id.0, error = %e, "listing serialization failed"),
        }

        Ok(listing)
    }

    /// Publish a new listing: allocate its id, upload the image blob, write
    /// the document, and append the result to the device's bulk cache log.
    pub async fn create(
        &self,
        draft: ListingDraft,
        image: Vec<u8>,
        owner: &UserId,
    ) -> Result<Listing, HejmoError> {
        let id = self.store.allocate_document_id(&self.collection);
        let path = self.blob_path(&id);

        self.store.upload_blob(&path, image).await?;
        let image_url = self.store.get_blob_url(&path).await?;

        let listing = Listing {
            id: ListingId(id.clone()),
            description: draft.description,
            area_size: draft.area_size,
            rooms: draft.rooms,
            price: draft.price,
            image_url,
            owner_id: owner.clone(),
            created_at: Utc::now(),
        };

        let fields = document_fields(&listing)
            .map_err(|e| HejmoError::Internal(format!("listing serialization failed: {e}")))?;
        self.store
            .set_document(&self.collection, &id, fields)
            .await?;
        debug!(id = %id, "listing created");

        self.append_to_device_log(&listing).await;
        Ok(listing)
    }

    /// Apply a partial edit, replacing the image blob only when a new one is
    /// provided. `created_at` and `owner_id` are never touched.
    pub async fn update(
        &self,
        id: &ListingId,
        patch: ListingPatch,
        new_image: Option<Vec<u8>>,
    ) -> Result<(), HejmoError> {
        let mut fields = serde_json::Map::new();
        if let Some(description) = patch.description {
            fields.insert("description".to_string(), Value::String(description));
        }
        if let Some(area_size) = patch.area_size {
            fields.insert("areaSize".to_string(), Value::String(area_size));
        }
        if let Some(rooms) = patch.rooms {
            fields.insert("rooms".to_string(), json!(rooms));
        }
        if let Some(price) = patch.price {
            fields.insert("price".to_string(), json!(price));
        }

        if let Some(bytes) = new_image {
            let path = self.blob_path(&id.0);
            self.store.upload_blob(&path, bytes).await?;
            let url = self.store.get_blob_url(&path).await?;
            fields.insert("imageUrl".to_string(), Value::String(url));
        }

        self.store
            .update_document(&self.collection, &id.0, Value::Object(fields))
            .await?;
        debug!(id = %id.0, "listing updated");
        Ok(())
    }

    fn blob_path(&self, id: &str) -> String {
        format!("{}/{}", self.blob_prefix, id)
    }

    /// Append a newly created listing to the bulk `listings` cache key.
    /// A read-modify-write on an advisory log: every failure is swallowed.
    async fn append_to_device_log(&self, listing: &Listing) {
        let existing = match self.cache.get(keys::LISTINGS_KEY).await {
            Ok(existing) => existing,
            Err(e) => {
                warn!(error = %e, "bulk cache read failed, skipping append");
                return;
            }
        };

        let mut entries: Vec<Listing> = match existing {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(error = %e, "bulk cache unreadable, skipping append");
                    return;
                }
            },
            None => Vec::new(),
        };
        entries.push(listing.clone());

        match serde_json::to_string(&entries) {
            Ok(raw) => {
                if let Err(e) = self.cache.set(keys::LISTINGS_KEY, &raw).await {
                    warn!(error = %e, "bulk cache write failed");
                }
            }
            Err(e) => warn!(error = %e, "bulk cache serialization failed"),
        }
    }
}

/// Serialize a listing into its document fields; the id is the document key,
/// not a field.
fn document_fields(listing: &Listing) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(listing)?;
    if let Value::Object(map) = &mut value {
        map.remove("id");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use hejmo_cache::SqliteCache;
    use hejmo_test_utils::MockRemoteStore;
    use serde_json::json;

    const LISTINGS: &str = "listings";

    fn listing_fields(owner: &str, created_at: &str) -> Value {
        json!({
            "description": "Flat",
            "areaSize": "40sqm",
            "rooms": 1,
            "price": 700.0,
            "imageUrl": "",
            "ownerId": owner,
            "createdAt": created_at,
        })
    }

    fn draft() -> ListingDraft {
        ListingDraft {
            description: "Sunny loft".into(),
            area_size: "80sqm".into(),
            rooms: 3,
            price: 1200.0,
        }
    }

    async fn sync_with(store: &Arc<MockRemoteStore>) -> (ListingSync, Arc<SqliteCache>) {
        let cache = Arc::new(SqliteCache::in_memory().await.unwrap());
        let sync = ListingSync::new(
            Arc::clone(store) as Arc<dyn RemoteStore>,
            Arc::clone(&cache) as Arc<dyn LocalCache>,
            LISTINGS,
            LISTINGS,
        );
        (sync, cache)
    }

    #[tokio::test]
    async fn snapshots_replace_the_working_set() {
        let store = Arc::new(MockRemoteStore::new());
        let (sync, _cache) = sync_with(&store).await;

        let query = ListingQuery::all().order_by("createdAt");
        let mut feed = sync.subscribe(&query).await.unwrap();
        assert!(feed.next_snapshot().await.unwrap().is_empty());

        store
            .insert_document(LISTINGS, "1", listing_fields("u1", "2026-01-01T00:00:01Z"))
            .await;
        assert_eq!(feed.next_snapshot().await.unwrap().len(), 1);

        store
            .insert_document(LISTINGS, "2", listing_fields("u1", "2026-01-01T00:00:02Z"))
            .await;
        assert_eq!(feed.next_snapshot().await.unwrap().len(), 2);

        store
            .insert_document(LISTINGS, "3", listing_fields("u1", "2026-01-01T00:00:03Z"))
            .await;
        let snapshot = feed.next_snapshot().await.unwrap();
        let ids: Vec<&str> = snapshot.iter().map(|l| l.id.0.as_str()).collect();
        // The consumer's visible set is exactly the three elements, replaced
        // wholesale, in ascending createdAt order.
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn owner_filter_restricts_every_snapshot() {
        let store = Arc::new(MockRemoteStore::new());
        let (sync, _cache) = sync_with(&store).await;
        let owner = UserId("u1".into());

        store
            .insert_document(LISTINGS, "a", listing_fields("u1", "2026-01-01T00:00:01Z"))
            .await;
        store
            .insert_document(LISTINGS, "b", listing_fields("u2", "2026-01-01T00:00:02Z"))
            .await;

        let mut feed = sync.subscribe(&ListingQuery::owned_by(&owner)).await.unwrap();
        let snapshot = feed.next_snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.iter().all(|l| l.owner_id == owner));

        // Another owner's write re-emits; the filter still holds.
        store
            .insert_document(LISTINGS, "c", listing_fields("u2", "2026-01-01T00:00:03Z"))
            .await;
        let snapshot = feed.next_snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.iter().all(|l| l.owner_id == owner));

        store
            .insert_document(LISTINGS, "d", listing_fields("u1", "2026-01-01T00:00:04Z"))
            .await;
        let snapshot = feed.next_snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|l| l.owner_id == owner));
    }

    #[tokio::test]
    async fn resubscribing_with_equal_parameters_matches_a_continuous_feed() {
        let store = Arc::new(MockRemoteStore::new());
        let (sync, _cache) = sync_with(&store).await;
        let query = ListingQuery::all().order_by("createdAt");

        let mut continuous = sync.subscribe(&query).await.unwrap();
        assert!(continuous.next_snapshot().await.unwrap().is_empty());

        let short_lived = sync.subscribe(&query).await.unwrap();
        drop(short_lived);

        store
            .insert_document(LISTINGS, "1", listing_fields("u1", "2026-01-01T00:00:01Z"))
            .await;
        store
            .insert_document(LISTINGS, "2", listing_fields("u1", "2026-01-01T00:00:02Z"))
            .await;
        continuous.next_snapshot().await.unwrap();
        let continuous_view = continuous.next_snapshot().await.unwrap();

        let mut resubscribed = sync.subscribe(&query).await.unwrap();
        let fresh_view = resubscribed.next_snapshot().await.unwrap();
        assert_eq!(fresh_view, continuous_view);
    }

    #[tokio::test]
    async fn detail_served_from_cache_never_touches_remote() {
        let store = Arc::new(MockRemoteStore::new());
        let (sync, cache) = sync_with(&store).await;

        let id = ListingId("l-1".into());
        let cached = Listing {
            id: id.clone(),
            description: "Cached flat".into(),
            area_size: "40sqm".into(),
            rooms: 1,
            price: 700.0,
            image_url: "".into(),
            owner_id: UserId("u1".into()),
            created_at: "2026-01-01T00:00:00Z".parse().unwrap(),
        };
        cache
            .set(
                &keys::listing_key(&id),
                &serde_json::to_string(&cached).unwrap(),
            )
            .await
            .unwrap();

        let listing = sync.detail(&id).await.unwrap();
        assert_eq!(listing, cached);
        assert_eq!(store.point_reads(LISTINGS), 0);
    }

    #[tokio::test]
    async fn detail_miss_populates_cache_then_serves_the_cached_copy() {
        let store = Arc::new(MockRemoteStore::new());
        let (sync, cache) = sync_with(&store).await;
        store
            .insert_document(LISTINGS, "l-1", listing_fields("u1", "2026-01-01T00:00:00Z"))
            .await;

        let id = ListingId("l-1".into());
        let first = sync.detail(&id).await.unwrap();
        assert_eq!(store.point_reads(LISTINGS), 1);

        // The cache now holds exactly the fetched document.
        let raw = cache.get(&keys::listing_key(&id)).await.unwrap().unwrap();
        let cached: Listing = serde_json::from_str(&raw).unwrap();
        assert_eq!(cached, first);

        let second = sync.detail(&id).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(store.point_reads(LISTINGS), 1, "no further remote read");
    }

    #[tokio::test]
    async fn detail_remote_miss_is_not_found_and_caches_nothing() {
        let store = Arc::new(MockRemoteStore::new());
        let (sync, cache) = sync_with(&store).await;

        let id = ListingId("ghost".into());
        let err = sync.detail(&id).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(cache.get(&keys::listing_key(&id)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreadable_cache_entry_falls_back_to_remote() {
        let store = Arc::new(MockRemoteStore::new());
        let (sync, cache) = sync_with(&store).await;
        store
            .insert_document(LISTINGS, "l-1", listing_fields("u1", "2026-01-01T00:00:00Z"))
            .await;

        let id = ListingId("l-1".into());
        cache
            .set(&keys::listing_key(&id), "not json")
            .await
            .unwrap();

        let listing = sync.detail(&id).await.unwrap();
        assert_eq!(listing.id, id);
        assert_eq!(store.point_reads(LISTINGS), 1);

        // The bad entry was repaired by the remote fetch.
        let raw = cache.get(&keys::listing_key(&id)).await.unwrap().unwrap();
        assert!(serde_json::from_str::<Listing>(&raw).is_ok());
    }

    #[tokio::test]
    async fn cache_failures_are_non_fatal_to_reads_and_creates() {
        struct FailingCache;

        #[async_trait::async_trait]
        impl LocalCache for FailingCache {
            async fn get(&self, _key: &str) -> Result<Option<String>, HejmoError> {
                Err(HejmoError::Cache {
                    source: "disk offline".into(),
                })
            }

            async fn set(&self, _key: &str, _value: &str) -> Result<(), HejmoError> {
                Err(HejmoError::Cache {
                    source: "disk offline".into(),
                })
            }
        }

        let store = Arc::new(MockRemoteStore::new());
        store
            .insert_document(LISTINGS, "l-1", listing_fields("u1", "2026-01-01T00:00:00Z"))
            .await;
        let sync = ListingSync::new(
            Arc::clone(&store) as Arc<dyn RemoteStore>,
            Arc::new(FailingCache),
            LISTINGS,
            LISTINGS,
        );

        let listing = sync.detail(&ListingId("l-1".into())).await.unwrap();
        assert_eq!(listing.id.0, "l-1");

        let created = sync
            .create(draft(), vec![1, 2, 3], &UserId("u1".into()))
            .await
            .unwrap();
        assert!(store.document_fields(LISTINGS, &created.id.0).is_some());
    }

    #[tokio::test]
    async fn create_uploads_blob_writes_document_and_appends_device_log() {
        let store = Arc::new(MockRemoteStore::new());
        let (sync, cache) = sync_with(&store).await;
        let owner = UserId("u-9".into());

        let listing = sync.create(draft(), vec![0xAB, 0xCD], &owner).await.unwrap();

        let path = format!("listings/{}", listing.id.0);
        assert_eq!(store.blob_bytes(&path).unwrap(), vec![0xAB, 0xCD]);
        assert_eq!(listing.image_url, format!("mock://blobs/{path}"));

        let fields = store.document_fields(LISTINGS, &listing.id.0).unwrap();
        assert!(fields.get("id").is_none(), "id is the key, not a field");
        assert_eq!(fields["ownerId"], json!("u-9"));
        assert_eq!(fields["rooms"], json!(3));

        let log: Vec<Listing> = serde_json::from_str(
            &cache.get(keys::LISTINGS_KEY).await.unwrap().unwrap(),
        )
        .unwrap();
        assert_eq!(log, vec![listing.clone()]);

        // A second creation appends rather than replaces.
        let second = sync.create(draft(), vec![0xEF], &owner).await.unwrap();
        let log: Vec<Listing> = serde_json::from_str(
            &cache.get(keys::LISTINGS_KEY).await.unwrap().unwrap(),
        )
        .unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].id, second.id);
    }

    #[tokio::test]
    async fn update_touches_only_patched_fields() {
        let store = Arc::new(MockRemoteStore::new());
        let (sync, _cache) = sync_with(&store).await;
        store
            .insert_document(LISTINGS, "l-1", listing_fields("u1", "2026-01-01T00:00:00Z"))
            .await;

        let patch = ListingPatch {
            price: Some(950.0),
            ..ListingPatch::default()
        };
        sync.update(&ListingId("l-1".into()), patch, None)
            .await
            .unwrap();

        let fields = store.document_fields(LISTINGS, "l-1").unwrap();
        assert_eq!(fields["price"], json!(950.0));
        assert_eq!(fields["description"], json!("Flat"));
        assert_eq!(fields["imageUrl"], json!(""));
        assert_eq!(fields["createdAt"], json!("2026-01-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn update_with_new_image_replaces_blob_and_url() {
        let store = Arc::new(MockRemoteStore::new());
        let (sync, _cache) = sync_with(&store).await;
        store
            .insert_document(LISTINGS, "l-1", listing_fields("u1", "2026-01-01T00:00:00Z"))
            .await;

        sync.update(
            &ListingId("l-1".into()),
            ListingPatch::default(),
            Some(vec![9, 9, 9]),
        )
        .await
        .unwrap();

        assert_eq!(store.blob_bytes("listings/l-1").unwrap(), vec![9, 9, 9]);
        let fields = store.document_fields(LISTINGS, "l-1").unwrap();
        assert_eq!(fields["imageUrl"], json!("mock://blobs/listings/l-1"));
    }

    #[tokio::test]
    async fn subscription_errors_arrive_on_their_own_channel() {
        let store = Arc::new(MockRemoteStore::new());
        let (sync, _cache) = sync_with(&store).await;

        let mut feed = sync.subscribe(&ListingQuery::all()).await.unwrap();
        feed.next_snapshot().await.unwrap();

        store.inject_query_error(LISTINGS, "permission denied").await;
        let err = feed.next_error().await.unwrap();
        assert!(matches!(err, HejmoError::Store { .. }));

        // The snapshot sequence is not terminated by the error.
        store
            .insert_document(LISTINGS, "1", listing_fields("u1", "2026-01-01T00:00:01Z"))
            .await;
        assert_eq!(feed.next_snapshot().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dropping_the_feed_releases_the_remote_listener() {
        let store = Arc::new(MockRemoteStore::new());
        let (sync, _cache) = sync_with(&store).await;

        let feed = sync.subscribe(&ListingQuery::all()).await.unwrap();
        assert_eq!(store.active_queries(LISTINGS), 1);

        drop(feed);
        tokio::time::timeout(Duration::from_secs(2), async {
            while store.active_queries(LISTINGS) > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("remote listener should be released on drop");
    }

    #[tokio::test]
    async fn detail_cache_is_not_invalidated_by_list_updates() {
        let store = Arc::new(MockRemoteStore::new());
        let (sync, _cache) = sync_with(&store).await;
        store
            .insert_document(LISTINGS, "l-1", listing_fields("u1", "2026-01-01T00:00:00Z"))
            .await;

        let id = ListingId("l-1".into());
        let before = sync.detail(&id).await.unwrap();
        assert_eq!(before.price, 700.0);

        let patch = ListingPatch {
            price: Some(999.0),
            ..ListingPatch::default()
        };
        sync.update(&id, patch, None).await.unwrap();

        // Accepted staleness window: the cached detail keeps serving the old
        // snapshot, and no further remote read happens.
        let after = sync.detail(&id).await.unwrap();
        assert_eq!(after.price, 700.0);
        assert_eq!(store.point_reads(LISTINGS), 1);
    }
}

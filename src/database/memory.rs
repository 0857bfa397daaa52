use super::{ChangeStream, DocumentStore};
use crate::{
    models::{
        document::{key_value, matches},
        ChangeEvent,
    },
    utils::AppError,
};
use async_trait::async_trait;
use futures::StreamExt;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use parking_lot::{Mutex, RwLock};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use tokio::sync::broadcast;

/// Per-collection buffer for change feeds; a watcher that falls further
/// behind than this skips ahead.
const FEED_CAPACITY: usize = 1024;

/// In-process document store.
///
/// Insert order is the order `find_many` reports. Change feeds emit the
/// same event layout a MongoDB change stream does.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

struct Inner {
    db_name: String,
    collections: RwLock<HashMap<String, Vec<Document>>>,
    feeds: Mutex<HashMap<String, broadcast::Sender<ChangeEvent>>>,
    sequence: AtomicU64,
}

impl MemoryStore {
    pub fn new(db_name: &str) -> Self {
        Self {
            inner: Arc::new(Inner {
                db_name: db_name.to_string(),
                collections: RwLock::new(HashMap::new()),
                feeds: Mutex::new(HashMap::new()),
                sequence: AtomicU64::new(0),
            }),
        }
    }

    /// Appends under the collection lock so that feed order matches
    /// insert order. A second document with an `_id` already in the
    /// collection is refused, as MongoDB's `_id_` index would.
    fn append(
        &self,
        collections: &mut HashMap<String, Vec<Document>>,
        collection: &str,
        doc: Document,
    ) -> Result<Bson, AppError> {
        let doc = with_object_id(doc);
        let id = doc.get("_id").cloned().unwrap_or(Bson::Null);

        let docs = collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| d.get("_id") == Some(&id)) {
            return Err(AppError::Store(format!(
                "E11000 duplicate key error collection: {}.{} index: _id_ dup key: {{ _id: {} }}",
                self.inner.db_name, collection, id
            )));
        }

        let sequence = self.inner.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let event = ChangeEvent::insert(&self.inner.db_name, collection, sequence, &doc);

        docs.push(doc);

        if let Some(feed) = self.inner.feeds.lock().get(collection) {
            // No receivers is fine: nobody is watching
            let _ = feed.send(event);
        }

        Ok(id)
    }

    /// Ends every open change feed, as a dropped connection would.
    #[cfg(test)]
    pub fn close_feeds(&self) {
        self.inner.feeds.lock().clear();
    }
}

/// Mirrors the driver: documents without `_id` get a fresh ObjectId, first.
fn with_object_id(doc: Document) -> Document {
    if doc.contains_key("_id") {
        return doc;
    }
    let mut stored = Document::new();
    stored.insert("_id", ObjectId::new());
    for (key, value) in doc {
        stored.insert(key, value);
    }
    stored
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_if_absent(
        &self,
        collection: &str,
        key: &str,
        doc: Document,
    ) -> Result<Bson, AppError> {
        let value = key_value(&doc, key);
        let mut filter = Document::new();
        filter.insert(key, value.clone());

        let mut collections = self.inner.collections.write();
        let exists = collections
            .get(collection)
            .map(|docs| docs.iter().any(|d| matches(d, &filter)))
            .unwrap_or(false);

        if exists {
            return Err(AppError::Conflict(format!("{} {} already exists", key, value)));
        }

        self.append(&mut collections, collection, doc)
    }

    async fn find_one(&self, collection: &str, key: &str, value: Bson) -> Result<Document, AppError> {
        let mut filter = Document::new();
        filter.insert(key, value.clone());

        self.inner
            .collections
            .read()
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, &filter)).cloned())
            .ok_or_else(|| AppError::NotFound(format!("{} {} in {}", key, value, collection)))
    }

    async fn insert(&self, collection: &str, doc: Document) -> Result<Bson, AppError> {
        let mut collections = self.inner.collections.write();
        self.append(&mut collections, collection, doc)
    }

    async fn find_many(&self, collection: &str, filter: Document) -> Result<Vec<Document>, AppError> {
        Ok(self
            .inner
            .collections
            .read()
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches(d, &filter)).cloned().collect())
            .unwrap_or_default())
    }

    async fn subscribe(&self, collection: &str) -> Result<ChangeStream, AppError> {
        let receiver = self
            .inner
            .feeds
            .lock()
            .entry(collection.to_string())
            .or_insert_with(|| broadcast::channel(FEED_CAPACITY).0)
            .subscribe();

        let collection = collection.to_string();
        let stream = futures::stream::unfold(receiver, move |mut receiver| {
            let collection = collection.clone();
            async move {
                loop {
                    match receiver.recv().await {
                        Ok(event) => return Some((Ok::<_, AppError>(event), receiver)),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            log::warn!("⚠️ Change feed on {} skipped {} events", collection, skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            }
        });

        Ok(stream.boxed())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EMAIL_KEY, SENSOR_DATA, USERS};
    use mongodb::bson::doc;

    #[tokio::test]
    async fn test_insert_assigns_id_first() {
        let store = MemoryStore::new("test");

        let id = store.insert(SENSOR_DATA, doc! { "email": "a@x.com", "temp": 21 }).await.unwrap();
        let stored = store.find_one(SENSOR_DATA, EMAIL_KEY, "a@x.com".into()).await.unwrap();

        assert!(matches!(id, Bson::ObjectId(_)));
        assert_eq!(stored.keys().next().map(String::as_str), Some("_id"));
        assert_eq!(stored.get("_id"), Some(&id));
    }

    #[tokio::test]
    async fn test_insert_if_absent_rejects_duplicates() {
        let store = MemoryStore::new("test");

        store
            .insert_if_absent(USERS, EMAIL_KEY, doc! { "email": "a@x.com", "name": "first" })
            .await
            .unwrap();
        let err = store
            .insert_if_absent(USERS, EMAIL_KEY, doc! { "email": "a@x.com", "name": "second" })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        let users = store.find_many(USERS, Document::new()).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].get_str("name").unwrap(), "first");
    }

    #[tokio::test]
    async fn test_find_many_keeps_insert_order() {
        let store = MemoryStore::new("test");
        for temp in [18, 19, 20] {
            store.insert(SENSOR_DATA, doc! { "email": "a@x.com", "temp": temp }).await.unwrap();
        }
        store.insert(SENSOR_DATA, doc! { "email": "b@x.com", "temp": 30 }).await.unwrap();

        let temps: Vec<i32> = store
            .find_many(SENSOR_DATA, doc! { "email": "a@x.com" })
            .await
            .unwrap()
            .iter()
            .map(|d| d.get_i32("temp").unwrap())
            .collect();

        assert_eq!(temps, vec![18, 19, 20]);
        assert!(store.find_many(SENSOR_DATA, doc! { "email": "c@x.com" }).await.unwrap().is_empty());
        assert!(store.find_many("missing", Document::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_refused() {
        let store = MemoryStore::new("test");
        let mut feed = store.subscribe(SENSOR_DATA).await.unwrap();

        store.insert(SENSOR_DATA, doc! { "_id": 1, "temp": 20 }).await.unwrap();
        let err = store.insert(SENSOR_DATA, doc! { "_id": 1, "temp": 21 }).await.unwrap_err();

        assert!(matches!(err, AppError::Store(ref e) if e.contains("duplicate key")));
        let stored = store.find_many(SENSOR_DATA, Document::new()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].get_i32("temp").unwrap(), 20);

        // only the accepted insert reaches watchers
        store.close_feeds();
        assert!(feed.next().await.unwrap().is_ok());
        assert!(feed.next().await.is_none());
    }

    #[tokio::test]
    async fn test_find_one_missing_is_not_found() {
        let store = MemoryStore::new("test");
        let err = store.find_one(USERS, EMAIL_KEY, "nobody@x.com".into()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_subscribe_sees_only_later_inserts_on_its_collection() {
        let store = MemoryStore::new("test");
        store.insert(SENSOR_DATA, doc! { "email": "early@x.com" }).await.unwrap();

        let mut feed = store.subscribe(SENSOR_DATA).await.unwrap();

        store.insert(USERS, doc! { "email": "a@x.com" }).await.unwrap();
        store.insert(SENSOR_DATA, doc! { "email": "a@x.com", "temp": 21 }).await.unwrap();

        let event = feed.next().await.unwrap().unwrap();
        assert_eq!(event.operation_type(), Some("insert"));
        assert_eq!(event.full_document().unwrap().get_str("email").unwrap(), "a@x.com");
        assert_eq!(event.to_json()["ns"]["coll"], SENSOR_DATA);

        store.close_feeds();
        assert!(feed.next().await.is_none());
    }
}

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoDB;

use crate::{
    models::{document::key_value, ChangeEvent},
    utils::AppError,
};
use async_trait::async_trait;
use futures::stream::BoxStream;
use mongodb::bson::{Bson, Document};

/// Live, non-restartable feed of changes on one collection.
pub type ChangeStream = BoxStream<'static, Result<ChangeEvent, AppError>>;

/// Collection-scoped access to the document store.
///
/// Handlers and the change bridge only talk to this trait, so the
/// in-memory backend can stand in for MongoDB locally and in tests.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Looks up a document by `key` (value read from `doc`) and inserts
    /// `doc` only if none exists. Returns the inserted id.
    ///
    /// The default is a find followed by an insert, which is not atomic
    /// across concurrent callers.
    async fn insert_if_absent(
        &self,
        collection: &str,
        key: &str,
        doc: Document,
    ) -> Result<Bson, AppError> {
        let value = key_value(&doc, key);
        match self.find_one(collection, key, value.clone()).await {
            Ok(_) => Err(AppError::Conflict(format!("{} {} already exists", key, value))),
            Err(AppError::NotFound(_)) => self.insert(collection, doc).await,
            Err(e) => Err(e),
        }
    }

    /// First document whose `key` equals `value`, or `NotFound`.
    async fn find_one(&self, collection: &str, key: &str, value: Bson) -> Result<Document, AppError>;

    /// Unconditional insert. Returns the inserted id.
    async fn insert(&self, collection: &str, doc: Document) -> Result<Bson, AppError>;

    /// Every match for an equality filter, in store order.
    async fn find_many(&self, collection: &str, filter: Document) -> Result<Vec<Document>, AppError>;

    async fn subscribe(&self, collection: &str) -> Result<ChangeStream, AppError>;

    async fn ping(&self) -> Result<(), AppError>;

    fn backend_name(&self) -> &'static str;
}

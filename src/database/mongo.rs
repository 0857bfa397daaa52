use super::{ChangeStream, DocumentStore};
use crate::{
    models::{ChangeEvent, EMAIL_KEY, SENSOR_DATA, USERS},
    utils::AppError,
};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use mongodb::{
    bson::{doc, Bson, Document},
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection, Database, IndexModel,
};
use std::time::Duration;

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, AppError> {
        let mut client_options = ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(Duration::from_secs(300));

        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        // Stable API v1, strict
        client_options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        let mongodb = Self { client, db };

        mongodb.ping().await?;
        log::info!("🏓 Pinged your deployment. You successfully connected to MongoDB!");

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Lookup indexes on the email key. Not unique: duplicate users are
    /// rejected by `insert_if_absent`, not by the store.
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        log::info!("🔧 Creating database indexes...");

        for name in [USERS, SENSOR_DATA] {
            let mut keys = Document::new();
            keys.insert(EMAIL_KEY, 1);
            let index = IndexModel::builder().keys(keys).build();

            match self.collection::<Document>(name).create_index(index).await {
                Ok(_) => log::info!("   ✅ Index created: {}({})", name, EMAIL_KEY),
                Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
            }
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

#[async_trait]
impl DocumentStore for MongoDB {
    async fn find_one(&self, collection: &str, key: &str, value: Bson) -> Result<Document, AppError> {
        let mut filter = Document::new();
        filter.insert(key, value.clone());

        self.collection::<Document>(collection)
            .find_one(filter)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {} in {}", key, value, collection)))
    }

    async fn insert(&self, collection: &str, doc: Document) -> Result<Bson, AppError> {
        let result = self.collection::<Document>(collection).insert_one(doc).await?;
        Ok(result.inserted_id)
    }

    async fn find_many(&self, collection: &str, filter: Document) -> Result<Vec<Document>, AppError> {
        let cursor = self.collection::<Document>(collection).find(filter).await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(docs)
    }

    async fn subscribe(&self, collection: &str) -> Result<ChangeStream, AppError> {
        // Raw documents so clients get exactly what the server sent
        let stream = self
            .collection::<Document>(collection)
            .watch()
            .await?
            .with_type::<Document>();

        log::info!("👀 Watching {}.{} for changes", self.db.name(), collection);

        Ok(stream
            .map(|item| item.map(ChangeEvent::from_raw).map_err(AppError::from))
            .boxed())
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}

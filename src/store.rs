use async_trait::async_trait;
use handle_errors::{Error as CustomError, Operation};
use mongodb::bson::{Document, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Database, IndexModel};
use tracing::debug;

use crate::connection::{DbClient, DbHandle, Driver};
use crate::types::config::IndexSpec;

/// Opens clients with the official MongoDB driver.
#[derive(Debug, Clone, Default)]
pub struct MongoDriver {
    app_name: Option<String>,
}

impl MongoDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name reported to the server in the connection handshake.
    pub fn with_app_name(app_name: impl Into<String>) -> Self {
        Self {
            app_name: Some(app_name.into()),
        }
    }
}

#[async_trait]
impl Driver for MongoDriver {
    type Client = MongoClient;

    async fn connect(&self, uri: &str) -> Result<MongoClient, CustomError> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(CustomError::ConnectionError)?;
        if self.app_name.is_some() {
            options.app_name = self.app_name.clone();
        }
        let client = Client::with_options(options).map_err(CustomError::ConnectionError)?;

        // The driver connects lazily, so make the server answer before handing
        // the client out.
        if let Err(e) = client.database("admin").run_command(doc! { "ping": 1 }).await {
            client.shutdown().await;
            return Err(CustomError::ConnectionError(e));
        }
        Ok(MongoClient { client })
    }
}

#[derive(Debug)]
pub struct MongoClient {
    client: Client,
}

#[async_trait]
impl DbClient for MongoClient {
    type Database = Store;

    fn database(&self, name: &str) -> Store {
        Store {
            db: self.client.database(name),
        }
    }

    async fn close(self) -> Result<(), CustomError> {
        self.client.shutdown().await;
        Ok(())
    }
}

fn index_model(index: &IndexSpec) -> IndexModel {
    IndexModel::builder()
        .keys(index.keys.clone())
        .options(Some(index.options.clone()))
        .build()
}

/// A handle on one MongoDB database.
#[derive(Debug, Clone)]
pub struct Store {
    pub db: Database,
}

impl Store {
    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.db.collection::<Document>(name)
    }
}

#[async_trait]
impl DbHandle for Store {
    fn name(&self) -> &str {
        self.db.name()
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, CustomError> {
        self.db
            .list_collection_names()
            .await
            .map_err(|e| CustomError::db(Operation::ListCollections, self.db.name(), e))
    }

    async fn create_collection(&self, name: &str) -> Result<(), CustomError> {
        debug!(collection = name, "creating collection");
        self.db
            .create_collection(name)
            .await
            .map_err(|e| CustomError::db(Operation::CreateCollection, name, e))
    }

    async fn create_index(&self, collection: &str, index: &IndexSpec) -> Result<(), CustomError> {
        debug!(collection, keys = %index.keys, "creating index");
        self.collection(collection)
            .create_index(index_model(index))
            .await
            .map(|_| ())
            .map_err(|e| CustomError::db(Operation::CreateIndex, collection, e))
    }

    async fn delete_all(&self, collection: &str) -> Result<u64, CustomError> {
        let deleted = self
            .collection(collection)
            .delete_many(doc! {})
            .await
            .map_err(|e| CustomError::db(Operation::DeleteMany, collection, e))?;
        debug!(collection, deleted = deleted.deleted_count, "cleared collection");
        Ok(deleted.deleted_count)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: &[Document],
    ) -> Result<usize, CustomError> {
        let inserted = self
            .collection(collection)
            .insert_many(documents)
            .await
            .map_err(|e| CustomError::db(Operation::InsertMany, collection, e))?;
        debug!(collection, inserted = inserted.inserted_ids.len(), "inserted documents");
        Ok(inserted.inserted_ids.len())
    }
}

//! Connection lifecycle.
//!
//! A [`Driver`] opens clients, a [`DbClient`] hands out database handles and
//! is released with [`DbClient::close`], and a [`DbHandle`] issues the
//! individual database calls. [`with_connection`] owns one client for the
//! duration of a single callback; [`create_connection`] leaves the client
//! open for the caller to close.

use std::future::Future;

use async_trait::async_trait;
use handle_errors::Error as CustomError;
use mongodb::bson::Document;
use tracing::{debug, warn};

use crate::types::config::{ConnectionConfig, IndexSpec};

#[async_trait]
pub trait Driver: Send + Sync {
    type Client: DbClient;

    /// Opens a client and verifies the server is reachable.
    async fn connect(&self, uri: &str) -> Result<Self::Client, CustomError>;
}

#[async_trait]
pub trait DbClient: Send + Sync {
    type Database: DbHandle;

    fn database(&self, name: &str) -> Self::Database;

    async fn close(self) -> Result<(), CustomError>;
}

#[async_trait]
pub trait DbHandle: Clone + Send + Sync {
    fn name(&self) -> &str;

    async fn list_collection_names(&self) -> Result<Vec<String>, CustomError>;

    async fn create_collection(&self, name: &str) -> Result<(), CustomError>;

    async fn create_index(&self, collection: &str, index: &IndexSpec) -> Result<(), CustomError>;

    /// Removes every document in `collection`, returning how many were deleted.
    async fn delete_all(&self, collection: &str) -> Result<u64, CustomError>;

    /// Returns the number of documents the server acknowledged.
    async fn insert_many(
        &self,
        collection: &str,
        documents: &[Document],
    ) -> Result<usize, CustomError>;
}

pub type DatabaseOf<D> = <<D as Driver>::Client as DbClient>::Database;

/// An open client and the database it was opened for. Dropping it does not
/// release the client; call [`Connection::close`].
pub struct Connection<C: DbClient> {
    pub client: C,
    pub db: C::Database,
}

impl<C: DbClient> Connection<C> {
    pub async fn close(self) -> Result<(), CustomError> {
        let Connection { client, db } = self;
        drop(db);
        client.close().await
    }
}

pub async fn create_connection<D: Driver>(
    driver: &D,
    config: &ConnectionConfig,
) -> Result<Connection<D::Client>, CustomError> {
    debug!(db = %config.db_name, "opening connection");
    let client = driver.connect(&config.uri).await?;
    let db = client.database(&config.db_name);
    Ok(Connection { client, db })
}

/// Runs `f` against a freshly opened database handle and closes the client
/// afterwards, whether `f` succeeded or not.
///
/// A failure to close is returned only when `f` succeeded; otherwise `f`'s
/// error wins and the close failure is logged.
pub async fn with_connection<D, F, Fut, T, E>(
    driver: &D,
    config: &ConnectionConfig,
    f: F,
) -> Result<T, E>
where
    D: Driver,
    F: FnOnce(DatabaseOf<D>) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<CustomError>,
{
    let Connection { client, db } = create_connection(driver, config).await?;

    let outcome = f(db).await;
    let released = client.close().await;
    match &released {
        Ok(()) => debug!(db = %config.db_name, "connection released"),
        Err(e) => debug!(db = %config.db_name, error = %e, "connection release failed"),
    }

    match (outcome, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_error)) => {
            warn!(error = %close_error, "failed to release connection after a failed operation");
            Err(e)
        }
    }
}

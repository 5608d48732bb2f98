use handle_errors::Error as CustomError;
use tracing::{debug, info, instrument};

use crate::connection::{DbHandle, Driver, with_connection};
use crate::types::config::{SeedConfig, SeedData};
use crate::types::results::SeedResult;

/// Clears (unless `clear_first` is `false`) and refills each collection in
/// `config.data`, in order.
///
/// Nothing here is transactional: a failure leaves earlier collections seeded
/// and the failing one possibly cleared.
#[instrument(skip_all, fields(db = %config.connection.db_name, clear_first = config.clear_first()))]
pub async fn seed_database<D: Driver>(
    driver: &D,
    config: &SeedConfig,
) -> Result<SeedResult, CustomError> {
    let clear_first = config.clear_first();
    with_connection(driver, &config.connection, |db| async move {
        seed_collections(&db, &config.data, clear_first).await
    })
    .await
}

async fn seed_collections<H: DbHandle>(
    db: &H,
    data: &SeedData,
    clear_first: bool,
) -> Result<SeedResult, CustomError> {
    let mut result = SeedResult::default();

    for (collection, documents) in data.iter() {
        if clear_first {
            db.delete_all(collection).await?;
            result.cleared.push(collection.to_string());
        }

        let inserted = if documents.is_empty() {
            debug!(collection, "no documents to insert");
            0
        } else {
            db.insert_many(collection, documents).await?
        };
        result.inserted.push((collection.to_string(), inserted));
    }

    Ok(result)
}

/// [`seed_database`] with progress lines for command-line use.
pub async fn seed_database_with_logging<D: Driver>(
    driver: &D,
    config: &SeedConfig,
) -> Result<SeedResult, CustomError> {
    info!("Connecting to MongoDB...");

    let result = seed_database(driver, config).await?;

    info!("Connected to database: {}", config.connection.db_name);
    if !result.cleared.is_empty() {
        info!("  Cleared collections: {}", result.cleared.join(", "));
    }
    for (collection, count) in &result.inserted {
        info!("  Inserted {} document(s) into {}", count, collection);
    }
    info!("Database seeding complete");

    Ok(result)
}

use std::collections::HashSet;

use handle_errors::Error as CustomError;
use tracing::{info, instrument};

use crate::connection::{DbHandle, Driver, with_connection};
use crate::types::config::{CollectionSpec, InitConfig};
use crate::types::results::InitResult;

/// Ensures every requested collection exists and issues every declared index.
///
/// Indexes are created on pre-existing collections too; the server treats an
/// identical index as a no-op. Work stops at the first failure and no partial
/// result is returned.
#[instrument(skip_all, fields(db = %config.connection.db_name))]
pub async fn init_database<D: Driver>(
    driver: &D,
    config: &InitConfig,
) -> Result<InitResult, CustomError> {
    config.validate()?;
    with_connection(driver, &config.connection, |db| async move {
        ensure_collections(&db, &config.collections).await
    })
    .await
}

async fn ensure_collections<H: DbHandle>(
    db: &H,
    collections: &[CollectionSpec],
) -> Result<InitResult, CustomError> {
    let mut result = InitResult::default();
    let existing: HashSet<String> = db.list_collection_names().await?.into_iter().collect();

    for spec in collections {
        if existing.contains(&spec.name) {
            result.existing.push(spec.name.clone());
        } else {
            db.create_collection(&spec.name).await?;
            result.created.push(spec.name.clone());
        }

        for index in &spec.indexes {
            db.create_index(&spec.name, index).await?;
            result.indexes_created += 1;
        }
    }

    Ok(result)
}

/// [`init_database`] with progress lines for command-line use.
pub async fn init_database_with_logging<D: Driver>(
    driver: &D,
    config: &InitConfig,
) -> Result<InitResult, CustomError> {
    info!("Connecting to MongoDB...");

    let result = init_database(driver, config).await?;

    info!("Connected to database: {}", config.connection.db_name);
    if !result.existing.is_empty() {
        info!("  Existing collections: {}", result.existing.join(", "));
    }
    if !result.created.is_empty() {
        info!("  Created collections: {}", result.created.join(", "));
    }
    if result.indexes_created > 0 {
        info!("  Created {} index(es)", result.indexes_created);
    }
    info!("Database initialization complete");

    Ok(result)
}

//! Opens a MongoDB connection for one operation, makes sure collections and
//! indexes exist, and bulk-loads seed documents.
//!
//! ```no_run
//! use mongo_bootstrap::bson::doc;
//! use mongo_bootstrap::{
//!     CollectionSpec, ConnectionConfig, IndexSpec, InitConfig, MongoDriver, SeedConfig,
//!     SeedData, init_database, seed_database,
//! };
//!
//! # async fn example() -> Result<(), mongo_bootstrap::Error> {
//! let connection = ConnectionConfig::new("mongodb://localhost:27017", "myapp");
//! let driver = MongoDriver::new();
//!
//! init_database(
//!     &driver,
//!     &InitConfig::new(
//!         connection.clone(),
//!         vec![
//!             CollectionSpec::new("users").with_index(IndexSpec::new(doc! { "email": 1 }).unique()),
//!             CollectionSpec::new("posts"),
//!         ],
//!     ),
//! )
//! .await?;
//!
//! let data = SeedData::new().with("users", vec![doc! { "name": "Alice", "email": "alice@example.com" }]);
//! seed_database(&driver, &SeedConfig::new(connection, data)).await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod controllers;
pub mod settings;
pub mod store;
pub mod types;
pub mod utils;

pub use connection::{
    Connection, DatabaseOf, DbClient, DbHandle, Driver, create_connection, with_connection,
};
pub use controllers::init::{init_database, init_database_with_logging};
pub use controllers::seed::{seed_database, seed_database_with_logging};
pub use handle_errors::{Error, Operation};
pub use mongodb::bson;
pub use settings::Settings;
pub use store::{MongoClient, MongoDriver, Store};
pub use types::config::{
    CollectionSpec, ConnectionConfig, IndexSpec, InitConfig, SeedConfig,
    SeedData,
};
pub use types::results::{InitResult, SeedResult};
pub use utils::seed_file::{load_seed_file, parse_seed_data};

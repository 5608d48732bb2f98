use std::env;
use std::path::PathBuf;

use config::{Config, File};
use handle_errors::Error as CustomError;
use serde::Deserialize;

use crate::types::config::{CollectionSpec, ConnectionConfig, InitConfig, SeedConfig, SeedData};

/// Settings for the command-line tool, read from a `setup` file and the
/// `MONGODB_URI` / `DATABASE_NAME` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub log_level: String,
    pub mongodb_uri: String,
    pub database_name: String,
    #[serde(default)]
    pub collections: Vec<CollectionSpec>,
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
    #[serde(default)]
    pub clear_first: Option<bool>,
}

impl Settings {
    pub fn load(name: &str) -> Result<Self, CustomError> {
        Self::load_with_overrides(
            name,
            env::var("MONGODB_URI").ok(),
            env::var("DATABASE_NAME").ok(),
        )
    }

    /// A missing file is not an error as long as the database name is
    /// supplied some other way.
    pub fn load_with_overrides(
        name: &str,
        mongodb_uri: Option<String>,
        database_name: Option<String>,
    ) -> Result<Self, CustomError> {
        let config = Config::builder()
            .set_default("log_level", "info")?
            .set_default("mongodb_uri", "mongodb://localhost:27017")?
            .add_source(File::with_name(name).required(false))
            .set_override_option("mongodb_uri", mongodb_uri)?
            .set_override_option("database_name", database_name)?
            .build()?;
        Ok(config.try_deserialize::<Settings>()?)
    }

    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig::new(&self.mongodb_uri, &self.database_name)
    }

    pub fn init_config(&self) -> InitConfig {
        InitConfig::new(self.connection(), self.collections.clone())
    }

    pub fn seed_config(&self, data: SeedData) -> SeedConfig {
        SeedConfig {
            connection: self.connection(),
            data,
            clear_first: self.clear_first,
        }
    }
}

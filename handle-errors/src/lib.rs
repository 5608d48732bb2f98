use std::fmt;
use std::path::PathBuf;

use config::ConfigError;
use mongodb::error::{Error as DBError, ErrorKind as DBErrorKind};
use thiserror::Error as ThisError;

/// The driver call that was in flight when a database error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListCollections,
    CreateCollection,
    CreateIndex,
    DeleteMany,
    InsertMany,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ListCollections => "listCollections",
            Operation::CreateCollection => "createCollection",
            Operation::CreateIndex => "createIndex",
            Operation::DeleteMany => "deleteMany",
            Operation::InsertMany => "insertMany",
        };
        f.write_str(name)
    }
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Cannot connect to the database")]
    ConnectionError(#[source] DBError),
    #[error("{operation} failed on `{target}`")]
    DbError {
        operation: Operation,
        target: String,
        #[source]
        source: DBError,
    },
    #[error("Cannot release the database connection")]
    CloseError(#[source] DBError),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Invalid configuration")]
    ConfigError(#[from] ConfigError),
    #[error("Cannot read seed file {}", .path.display())]
    SeedFileError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid seed data: {0}")]
    SeedDataError(String),
}

impl Error {
    pub fn db(operation: Operation, target: impl Into<String>, source: DBError) -> Self {
        Error::DbError {
            operation,
            target: target.into(),
            source,
        }
    }

    /// The driver error behind this failure, if the database produced one.
    pub fn db_source(&self) -> Option<&DBError> {
        match self {
            Error::ConnectionError(e) | Error::CloseError(e) => Some(e),
            Error::DbError { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_authentication(&self) -> bool {
        self.db_source()
            .is_some_and(|e| matches!(*e.kind, DBErrorKind::Authentication { .. }))
    }
}

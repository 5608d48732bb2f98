use std::fs;
use std::path::Path;

use handle_errors::Error as CustomError;

use crate::types::config::SeedData;

/// Reads a JSON object of `{ "collection": [ { ...document }, ... ] }`.
/// Collections keep the order they appear in the file.
pub fn load_seed_file(path: impl AsRef<Path>) -> Result<SeedData, CustomError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| CustomError::SeedFileError {
        path: path.to_path_buf(),
        source,
    })?;
    parse_seed_data(&raw)
}

pub fn parse_seed_data(raw: &str) -> Result<SeedData, CustomError> {
    serde_json::from_str::<SeedData>(raw).map_err(|e| CustomError::SeedDataError(e.to_string()))
}

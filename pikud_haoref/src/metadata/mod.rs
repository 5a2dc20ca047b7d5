pub mod shelters;
pub mod time_identifiers;

use crate::error::BuildError;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Reads and decodes a JSON data file. `Ok(None)` when the file does not exist.
pub async fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, BuildError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(BuildError::ReadFile {
                path: path.display().to_string(),
                source,
            });
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| BuildError::DecodeFile {
            path: path.display().to_string(),
            source,
        })
}

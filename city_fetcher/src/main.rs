use pikud_haoref::cities::{CityMetadata, CityMetadataBuilder};
use pikud_haoref::error::{BuildError, InitializationError};
use pikud_haoref::{init_tracing, load_config};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_tracing()?;

    let config = load_config().map_err(InitializationError::from)?;
    debug!(cities = ?config.cities, "config loaded");

    let res = fetch_and_write(&config).await;
    match res {
        Ok(()) => info!(path = %config.cities.output_file.display(), "wrote city metadata successfully"),
        Err(ref e) => error!(error = ?e, "failed to build city metadata"),
    }

    res
}

async fn fetch_and_write(config: &pikud_haoref::Config) -> Result<(), AppError> {
    let builder = CityMetadataBuilder::from_config(config).await?;
    let metadata = builder.build().await?;
    info!(count = metadata.len(), "built city metadata");
    write_metadata(&config.cities.output_file, &metadata).await
}

async fn write_metadata(path: &Path, metadata: &[CityMetadata]) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(metadata)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Init(#[from] InitializationError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("failed to serialize city metadata: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write city metadata: {0}")]
    Io(#[from] std::io::Error),
}

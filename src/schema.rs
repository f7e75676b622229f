use tracing::info;

use crate::{
    error::StorageResult,
    storage::DataSource,
    store::{MovieStore, ScheduleStore},
};

/// Creates the movies table, then the schedules table that references it.
pub async fn install(source: &DataSource) -> StorageResult<()> {
    MovieStore::new(source).create_table().await?;
    ScheduleStore::new(source).create_table().await?;
    info!("schema installed");
    Ok(())
}

/// Drops the tables in reverse dependency order.
pub async fn uninstall(source: &DataSource) -> StorageResult<()> {
    ScheduleStore::new(source).drop_table().await?;
    MovieStore::new(source).drop_table().await?;
    info!("schema uninstalled");
    Ok(())
}

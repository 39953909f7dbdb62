// starload-core/src/application/run_log.rs

use tracing::{debug, warn};

use crate::application::{bootstrap, writer};
use crate::domain::run_log::RunLogEntry;
use crate::domain::table::Table;
use crate::domain::warehouse::catalog;
use crate::error::StarloadError;
use crate::ports::connector::Connector;

pub async fn try_record(
    connector: &dyn Connector,
    entry: RunLogEntry,
) -> Result<(), StarloadError> {
    bootstrap::ensure_table(connector, &catalog::ETL_LOG).await?;
    let batch = Table::from_records(&catalog::ETL_LOG, [entry])?;
    writer::append(connector, &catalog::ETL_LOG, &batch).await?;
    Ok(())
}

/// Appends one entry to `etl_log`. A failed write is only a warning: it never
/// changes the outcome of the stage being logged.
pub async fn record(connector: &dyn Connector, entry: RunLogEntry) {
    let process = entry.process_name.clone();
    let status = entry.status;
    match try_record(connector, entry).await {
        Ok(()) => debug!(process, %status, "Run log entry written"),
        Err(e) => warn!(process, %status, error = %e, "Could not write run log entry"),
    }
}

/// Latest entries, newest first.
pub async fn recent(connector: &dyn Connector, limit: usize) -> Result<Table, StarloadError> {
    if !connector.table_exists(catalog::ETL_LOG.name).await? {
        return Ok(Table::default());
    }
    connector
        .query(
            &format!(
                "SELECT process_name, run_timestamp, status, records_processed, details \
                 FROM {} ORDER BY log_id DESC LIMIT {}",
                catalog::ETL_LOG.name,
                limit
            ),
            &[],
        )
        .await
}

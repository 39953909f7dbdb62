// starload-core/src/application/inspect.rs

use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::domain::error::DomainError;
use crate::domain::table::Table;
use crate::error::StarloadError;
use crate::ports::connector::Connector;

/// `Sales.Customer` -> `"Sales"."Customer"`
pub fn quote_table_name(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// First `limit` rows of any table reachable through the connector.
#[instrument(skip(connector))]
pub async fn preview_table(
    connector: &dyn Connector,
    table: &str,
    limit: usize,
) -> Result<Table, StarloadError> {
    if !connector.table_exists(table).await? {
        return Err(DomainError::TableNotFound(table.to_string()).into());
    }

    let start = Instant::now();
    let query = format!("SELECT * FROM {} LIMIT {}", quote_table_name(table), limit);
    match connector.query(&query, &[]).await {
        Ok(rows) => {
            debug!("Preview of {} finished in {:.2?}", table, start.elapsed());
            Ok(rows)
        }
        Err(e) => {
            error!("Preview of {} failed after {:.2?}: {}", table, start.elapsed(), e);
            Err(e)
        }
    }
}

// starload-core/src/application/status.rs

use serde::Serialize;

use crate::domain::warehouse::{TableKind, catalog};
use crate::error::StarloadError;
use crate::ports::connector::Connector;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStatus {
    pub table: &'static str,
    pub kind: TableKind,
    /// `None` when the table does not exist.
    pub rows: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarehouseStatus {
    pub tables: Vec<TableStatus>,
}

impl WarehouseStatus {
    pub fn rows(&self, table: &str) -> Option<u64> {
        self.tables
            .iter()
            .find(|t| t.table == table)
            .and_then(|t| t.rows)
    }

    /// Rows across dimensions and facts; the run log is left out.
    pub fn total(&self) -> u64 {
        self.tables
            .iter()
            .filter(|t| t.kind != TableKind::Log)
            .filter_map(|t| t.rows)
            .sum()
    }
}

pub async fn count_rows(
    connector: &dyn Connector,
    table: &str,
) -> Result<Option<u64>, StarloadError> {
    if !connector.table_exists(table).await? {
        return Ok(None);
    }
    let result = connector
        .query(&format!("SELECT count(*) AS n FROM {}", table), &[])
        .await?;
    Ok(result
        .records()
        .next()
        .and_then(|r| r.int("n"))
        .and_then(|n| u64::try_from(n).ok()))
}

pub async fn warehouse_status(connector: &dyn Connector) -> Result<WarehouseStatus, StarloadError> {
    let mut tables = Vec::new();
    for schema in catalog::all_tables() {
        tables.push(TableStatus {
            table: schema.name,
            kind: schema.kind,
            rows: count_rows(connector, schema.name).await?,
        });
    }
    Ok(WarehouseStatus { tables })
}

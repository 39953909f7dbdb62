// starload-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use duckdb::types::{TimeUnit, ToSql, ToSqlOutput, Value as DuckValue, ValueRef};
use duckdb::{Config, Connection, Row, params_from_iter};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, instrument};

use crate::domain::table::Table;
use crate::domain::value::Value;
use crate::error::StarloadError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::connector::{ColumnSchema, Connector, SqlStatement};

pub struct DuckDBConnector {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDBConnector {
    /// Opens `db_path` (or an in-memory database for `:memory:`), creating
    /// missing parent folders.
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();

        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            if let Some(parent) = Path::new(db_path).parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            Connection::open_with_flags(db_path, config)?
        };

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StarloadError> {
        self.conn.lock().map_err(|_| {
            StarloadError::Infrastructure(InfrastructureError::Io(std::io::Error::other(
                "DuckDB Mutex Poisoned",
            )))
        })
    }
}

fn db_err(e: duckdb::Error) -> StarloadError {
    StarloadError::Infrastructure(InfrastructureError::Database(DatabaseError::DuckDB(e)))
}

fn statement_err(sql: &str, e: duckdb::Error) -> StarloadError {
    StarloadError::Infrastructure(InfrastructureError::Database(DatabaseError::Statement {
        sql: sql.to_string(),
        message: e.to_string(),
    }))
}

// --- VALUE MAPPING ---

// Dates and timestamps travel as text; statements CAST them on the way in.
impl ToSql for Value {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(DuckValue::Null),
            Value::Bool(b) => ToSqlOutput::Owned(DuckValue::Boolean(*b)),
            Value::Int(v) => ToSqlOutput::Owned(DuckValue::BigInt(*v)),
            Value::Float(v) => ToSqlOutput::Owned(DuckValue::Double(*v)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Date(_) | Value::Timestamp(_) => {
                ToSqlOutput::Owned(DuckValue::Text(self.to_string()))
            }
        })
    }
}

fn date_from_days(days: i32) -> Value {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|epoch| epoch.checked_add_signed(chrono::Duration::days(days.into())))
        .map_or(Value::Null, Value::Date)
}

fn timestamp_from(unit: TimeUnit, raw: i64) -> Value {
    let micros = match unit {
        TimeUnit::Second => raw.checked_mul(1_000_000),
        TimeUnit::Millisecond => raw.checked_mul(1_000),
        TimeUnit::Microsecond => Some(raw),
        TimeUnit::Nanosecond => Some(raw / 1_000),
    };
    micros
        .and_then(DateTime::from_timestamp_micros)
        .map(|dt| dt.naive_utc())
        .map_or(Value::Null, |ts: NaiveDateTime| Value::Timestamp(ts))
}

fn read_cell(row: &Row<'_>, idx: usize) -> Result<Value, duckdb::Error> {
    let value = match row.get_ref(idx)? {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(v) => Value::Int(v.into()),
        ValueRef::SmallInt(v) => Value::Int(v.into()),
        ValueRef::Int(v) => Value::Int(v.into()),
        ValueRef::BigInt(v) => Value::Int(v),
        ValueRef::UTinyInt(v) => Value::Int(v.into()),
        ValueRef::USmallInt(v) => Value::Int(v.into()),
        ValueRef::UInt(v) => Value::Int(v.into()),
        ValueRef::UBigInt(v) => i64::try_from(v).map_or(Value::Float(v as f64), Value::Int),
        ValueRef::HugeInt(v) => i64::try_from(v).map_or(Value::Float(v as f64), Value::Int),
        ValueRef::Float(v) => Value::from(f64::from(v)),
        ValueRef::Double(v) => Value::from(v),
        ValueRef::Decimal(d) => d.to_string().parse::<f64>().map_or(Value::Null, Value::from),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Date32(days) => date_from_days(days),
        ValueRef::Timestamp(unit, raw) => timestamp_from(unit, raw),
        // Intervals, blobs and nested types: numeric if the engine can widen it, text otherwise
        _ => row
            .get::<_, f64>(idx)
            .map(Value::from)
            .or_else(|_| row.get::<_, String>(idx).map(Value::Text))
            .unwrap_or(Value::Null),
    };
    Ok(value)
}

fn split_table_name(name: &str) -> (&str, &str) {
    name.split_once('.').unwrap_or(("main", name))
}

#[async_trait]
impl Connector for DuckDBConnector {
    async fn execute(&self, query: &str) -> Result<(), StarloadError> {
        let conn = self.lock()?;
        conn.execute_batch(query)
            .map_err(|e| statement_err(query, e))
    }

    #[instrument(skip(self, params), fields(params = params.len()))]
    async fn query(&self, query: &str, params: &[Value]) -> Result<Table, StarloadError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(query).map_err(|e| statement_err(query, e))?;
        let mut rows = stmt
            .query(params_from_iter(params.iter()))
            .map_err(|e| statement_err(query, e))?;

        let columns = rows
            .as_ref()
            .map(|s| s.column_names())
            .unwrap_or_default();
        let width = columns.len();
        let mut table = Table::new(columns);

        while let Some(row) = rows.next().map_err(db_err)? {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                cells.push(read_cell(row, idx).map_err(db_err)?);
            }
            table.rows.push(cells);
        }

        debug!(rows = table.len(), "Query returned");
        Ok(table)
    }

    async fn table_exists(&self, table_name: &str) -> Result<bool, StarloadError> {
        let (schema, table) = split_table_name(table_name);
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM information_schema.tables \
                 WHERE lower(table_schema) = lower(?) AND lower(table_name) = lower(?)",
                duckdb::params![schema, table],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        Ok(count > 0)
    }

    async fn fetch_columns(&self, table_name: &str) -> Result<Vec<ColumnSchema>, StarloadError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info('{}')", table_name))
            .map_err(db_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ColumnSchema {
                    name: row.get("name")?,
                    data_type: row.get("type")?,
                    is_nullable: !row.get::<_, bool>("notnull")?,
                })
            })
            .map_err(db_err)?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row.map_err(db_err)?);
        }

        Ok(columns)
    }

    #[instrument(skip(self, statements), fields(statements = statements.len()))]
    async fn execute_atomic(&self, statements: &[SqlStatement]) -> Result<usize, StarloadError> {
        let mut conn = self.lock()?;
        // Dropping the transaction without commit rolls it back
        let tx = conn.transaction().map_err(db_err)?;
        let mut affected = 0;

        for statement in statements {
            if statement.rows.is_empty() {
                affected += tx
                    .execute(&statement.sql, [])
                    .map_err(|e| statement_err(&statement.sql, e))?;
                continue;
            }

            let mut prepared = tx
                .prepare(&statement.sql)
                .map_err(|e| statement_err(&statement.sql, e))?;
            for params in &statement.rows {
                affected += prepared
                    .execute(params_from_iter(params.iter()))
                    .map_err(|e| statement_err(&statement.sql, e))?;
            }
        }

        tx.commit().map_err(db_err)?;
        debug!(affected, "Transaction committed");
        Ok(affected)
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[tokio::test]
    async fn test_duckdb_flow() -> Result<()> {
        let connector = DuckDBConnector::new(":memory:")?;

        connector
            .execute("CREATE TABLE users (id INTEGER, name VARCHAR)")
            .await?;

        let columns = connector.fetch_columns("users").await?;
        assert_eq!(columns.len(), 2);

        let name_col = columns
            .iter()
            .find(|c| c.name == "name")
            .ok_or_else(|| anyhow::anyhow!("Column 'name' not found"))?;
        assert_eq!(name_col.data_type, "VARCHAR");
        Ok(())
    }

    #[tokio::test]
    async fn test_duckdb_error() -> Result<()> {
        let connector = DuckDBConnector::new(":memory:")?;
        let result = connector.execute("SELECT * FROM non_existent_table").await;
        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_query_round_trips_types() -> Result<()> {
        let connector = DuckDBConnector::new(":memory:")?;
        connector
            .execute(
                "CREATE TABLE t (id BIGINT, price DECIMAL(10,4), d DATE, ts TIMESTAMP, ok BOOLEAN)",
            )
            .await?;
        connector
            .execute_atomic(&[SqlStatement::with_params(
                "INSERT INTO t VALUES (?, ?, CAST(? AS DATE), CAST(? AS TIMESTAMP), ?)",
                vec![
                    Value::Int(7),
                    Value::Float(12.5),
                    NaiveDate::from_ymd_opt(2013, 7, 4).unwrap().into(),
                    NaiveDate::from_ymd_opt(2013, 7, 4)
                        .unwrap()
                        .and_hms_opt(10, 30, 0)
                        .unwrap()
                        .into(),
                    Value::Bool(true),
                ],
            )])
            .await?;

        let table = connector
            .query("SELECT * FROM t WHERE id = ?", &[Value::Int(7)])
            .await?;
        assert_eq!(table.columns, vec!["id", "price", "d", "ts", "ok"]);

        let row = table.records().next().unwrap();
        assert_eq!(row.int("id"), Some(7));
        assert_eq!(row.float("price"), Some(12.5));
        assert_eq!(
            row.get("d"),
            &Value::Date(NaiveDate::from_ymd_opt(2013, 7, 4).unwrap())
        );
        assert_eq!(
            row.get("ts").as_date(),
            NaiveDate::from_ymd_opt(2013, 7, 4)
        );
        assert_eq!(row.get("ok"), &Value::Bool(true));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_transaction_keeps_nothing() -> Result<()> {
        let connector = DuckDBConnector::new(":memory:")?;
        connector.execute("CREATE TABLE t (id BIGINT)").await?;

        let result = connector
            .execute_atomic(&[
                SqlStatement::batch(
                    "INSERT INTO t VALUES (?)",
                    vec![vec![Value::Int(1)], vec![Value::Int(2)]],
                ),
                SqlStatement::new("INSERT INTO missing_table VALUES (1)"),
            ])
            .await;
        assert!(result.is_err());

        let table = connector.query("SELECT count(*) AS n FROM t", &[]).await?;
        assert_eq!(table.records().next().and_then(|r| r.int("n")), Some(0));
        Ok(())
    }

    #[tokio::test]
    async fn test_table_exists_with_schema() -> Result<()> {
        let connector = DuckDBConnector::new(":memory:")?;
        connector
            .execute("CREATE SCHEMA Sales; CREATE TABLE Sales.Currency (CurrencyCode VARCHAR)")
            .await?;

        assert!(connector.table_exists("sales.currency").await?);
        assert!(!connector.table_exists("currency").await?);
        assert!(!connector.table_exists("sales.store").await?);
        Ok(())
    }
}

// starload-core/src/ports/connector.rs

// What the pipeline needs from a database, without knowing which one.
// The same port serves the source system and the warehouse.

use crate::domain::table::Table;
use crate::domain::value::Value;
use crate::error::StarloadError;
use async_trait::async_trait;

// Column description, independent of the engine
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
}

/// One SQL statement and the parameter sets it runs with.
///
/// An empty `rows` list runs the statement once without parameters; otherwise
/// the statement is prepared once and executed for every parameter row.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub rows: Vec<Vec<Value>>,
}

impl SqlStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            rows: Vec::new(),
        }
    }

    pub fn with_params(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            rows: vec![params],
        }
    }

    pub fn batch(sql: impl Into<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            sql: sql.into(),
            rows,
        }
    }
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn execute(&self, query: &str) -> Result<(), StarloadError>;

    /// Runs a parameterized read and returns the full result set.
    async fn query(&self, query: &str, params: &[Value]) -> Result<Table, StarloadError>;

    /// Accepts `table` or `schema.table`.
    async fn table_exists(&self, table_name: &str) -> Result<bool, StarloadError>;

    async fn fetch_columns(&self, table_name: &str) -> Result<Vec<ColumnSchema>, StarloadError>;

    /// Runs every statement inside one transaction. Nothing is kept if any
    /// statement fails. Returns the total number of affected rows.
    async fn execute_atomic(&self, statements: &[SqlStatement]) -> Result<usize, StarloadError>;

    fn engine_name(&self) -> &str;
}

// starload-core/src/application/bootstrap.rs

use tracing::{info, instrument};

use crate::domain::warehouse::{ColumnRole, TableSchema, catalog};
use crate::error::StarloadError;
use crate::ports::connector::{Connector, SqlStatement};

/// DDL for one declared table: its surrogate-key sequence (if any), then the
/// table itself. Both statements are idempotent.
pub fn create_table_sql(schema: &TableSchema) -> Vec<String> {
    let mut statements = Vec::new();
    let sequence = schema.sequence_name();

    if let Some(seq) = &sequence {
        statements.push(format!("CREATE SEQUENCE IF NOT EXISTS {} START 1", seq));
    }

    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|c| match (&sequence, c.role) {
            (Some(seq), ColumnRole::SurrogateKey) => format!(
                "    {} {} PRIMARY KEY DEFAULT nextval('{}')",
                c.name,
                c.sql_type.as_sql(),
                seq
            ),
            _ => format!("    {} {}", c.name, c.sql_type.as_sql()),
        })
        .collect();

    statements.push(format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
        schema.name,
        columns.join(",\n")
    ));
    statements
}

pub async fn create_table(
    connector: &dyn Connector,
    schema: &TableSchema,
) -> Result<(), StarloadError> {
    let statements: Vec<SqlStatement> = create_table_sql(schema)
        .into_iter()
        .map(SqlStatement::new)
        .collect();
    connector.execute_atomic(&statements).await?;
    info!(table = schema.name, "Table created");
    Ok(())
}

/// Creates `schema` when it is missing. Returns true if it had to.
pub async fn ensure_table(
    connector: &dyn Connector,
    schema: &TableSchema,
) -> Result<bool, StarloadError> {
    if connector.table_exists(schema.name).await? {
        return Ok(false);
    }
    create_table(connector, schema).await?;
    Ok(true)
}

/// True when none of the declared tables exist yet.
pub async fn needs_bootstrap(connector: &dyn Connector) -> Result<bool, StarloadError> {
    for schema in catalog::all_tables() {
        if connector.table_exists(schema.name).await? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Creates every missing declared table. Returns how many were created.
#[instrument(skip(connector), fields(engine = connector.engine_name()))]
pub async fn bootstrap_warehouse(connector: &dyn Connector) -> Result<usize, StarloadError> {
    let mut created = 0;
    for schema in catalog::all_tables() {
        if ensure_table(connector, schema).await? {
            created += 1;
        }
    }
    info!(created, "Warehouse bootstrap complete");
    Ok(created)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::duckdb::DuckDBConnector;
    use anyhow::Result;

    #[test]
    fn test_dimension_ddl_uses_sequence_default() {
        let ddl = create_table_sql(&catalog::DIM_CURRENCY);
        assert_eq!(ddl.len(), 2);
        assert_eq!(
            ddl[0],
            "CREATE SEQUENCE IF NOT EXISTS seq_dim_currency_currency_key START 1"
        );
        assert!(ddl[1].contains(
            "currency_key BIGINT PRIMARY KEY DEFAULT nextval('seq_dim_currency_currency_key')"
        ));
        assert!(ddl[1].contains("saved_date DATE"));
    }

    #[test]
    fn test_fact_ddl_has_no_sequence() {
        let ddl = create_table_sql(&catalog::FACT_RESELLER_SALES);
        assert_eq!(ddl.len(), 1);
        assert!(ddl[0].starts_with("CREATE TABLE IF NOT EXISTS fact_reseller_sales"));
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() -> Result<()> {
        let warehouse = DuckDBConnector::new(":memory:")?;
        assert!(needs_bootstrap(&warehouse).await?);

        let created = bootstrap_warehouse(&warehouse).await?;
        assert_eq!(created, catalog::all_tables().count());
        assert!(!needs_bootstrap(&warehouse).await?);

        assert_eq!(bootstrap_warehouse(&warehouse).await?, 0);

        let columns = warehouse.fetch_columns("dim_product").await?;
        assert_eq!(columns.len(), catalog::DIM_PRODUCT.columns.len());
        Ok(())
    }

    #[tokio::test]
    async fn test_surrogate_keys_are_generated() -> Result<()> {
        let warehouse = DuckDBConnector::new(":memory:")?;
        create_table(&warehouse, &catalog::DIM_CURRENCY).await?;
        warehouse
            .execute(
                "INSERT INTO dim_currency (currency_code, currency_name, saved_date)
                 VALUES ('EUR', 'Euro', DATE '2024-01-01'), ('USD', 'US Dollar', DATE '2024-01-01')",
            )
            .await?;

        let table = warehouse
            .query("SELECT currency_key FROM dim_currency ORDER BY currency_key", &[])
            .await?;
        let keys: Vec<Option<i64>> = table.records().map(|r| r.int("currency_key")).collect();
        assert_eq!(keys, vec![Some(1), Some(2)]);
        Ok(())
    }
}

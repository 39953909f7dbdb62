// starload-core/src/application/writer.rs
//
// Dimension persistence. Every policy runs as one transaction; an empty batch
// never touches the table.

use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::application::bootstrap;
use crate::domain::error::DomainError;
use crate::domain::project::DimensionPolicy;
use crate::domain::table::Table;
use crate::domain::value::{NaturalKey, Value};
use crate::domain::warehouse::{ColumnDef, TableSchema};
use crate::error::StarloadError;
use crate::ports::connector::{Connector, SqlStatement};

fn placeholder(column: &ColumnDef) -> String {
    format!("CAST(? AS {})", column.sql_type.as_sql())
}

/// Null-safe match on every natural key column.
fn key_predicate(schema: &TableSchema) -> Result<String, DomainError> {
    if schema.natural_key.is_empty() {
        return Err(DomainError::InvalidSetting(format!(
            "'{}' declares no natural key",
            schema.name
        )));
    }
    schema
        .natural_key
        .iter()
        .map(|key| {
            schema
                .column(key)
                .map(|c| format!("{} IS NOT DISTINCT FROM {}", c.name, placeholder(c)))
                .ok_or_else(|| DomainError::UnknownTable(format!("{}.{}", schema.name, key)))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|parts| parts.join(" AND "))
}

/// Batches must carry exactly the insertable columns, in declaration order.
fn check_layout(schema: &TableSchema, batch: &Table) -> Result<(), DomainError> {
    let expected: Vec<&str> = schema.insert_columns().map(|c| c.name).collect();
    let matches = batch.columns.len() == expected.len()
        && batch
            .columns
            .iter()
            .zip(&expected)
            .all(|(a, b)| a.eq_ignore_ascii_case(b));
    if matches {
        return Ok(());
    }
    Err(DomainError::SchemaMismatch {
        table: schema.name.to_string(),
        expected: expected.join(", "),
        found: batch.columns.join(", "),
    })
}

pub fn insert_statement(schema: &TableSchema, batch: &Table) -> SqlStatement {
    let columns: Vec<&ColumnDef> = schema.insert_columns().collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.name,
        columns.iter().map(|c| c.name).collect::<Vec<_>>().join(", "),
        columns.iter().map(|c| placeholder(c)).collect::<Vec<_>>().join(", ")
    );
    SqlStatement::batch(sql, batch.rows.clone())
}

pub fn delete_all_statement(schema: &TableSchema) -> SqlStatement {
    SqlStatement::new(format!("DELETE FROM {}", schema.name))
}

fn pick(row: &[Value], positions: &[usize]) -> Vec<Value> {
    positions
        .iter()
        .map(|&i| row.get(i).cloned().unwrap_or_default())
        .collect()
}

/// One row per natural key: the last occurrence wins, at the position of the
/// first one.
fn collapse_by_key(rows: &[Vec<Value>], key_positions: &[usize]) -> Vec<Vec<Value>> {
    let mut seen: HashMap<Vec<Option<NaturalKey>>, usize> = HashMap::new();
    let mut collapsed: Vec<Vec<Value>> = Vec::with_capacity(rows.len());
    for row in rows {
        let key: Vec<Option<NaturalKey>> = key_positions
            .iter()
            .map(|&i| row.get(i).and_then(NaturalKey::from_value))
            .collect();
        match seen.get(&key) {
            Some(&idx) => collapsed[idx] = row.clone(),
            None => {
                seen.insert(key, collapsed.len());
                collapsed.push(row.clone());
            }
        }
    }
    collapsed
}

/// UPDATE matching natural keys, then INSERT the rows whose key is absent.
/// Rows repeating a natural key are collapsed first.
pub fn upsert_statements(
    schema: &TableSchema,
    batch: &Table,
) -> Result<Vec<SqlStatement>, DomainError> {
    let predicate = key_predicate(schema)?;
    let columns: Vec<&ColumnDef> = schema.insert_columns().collect();

    let key_positions: Vec<usize> = schema
        .natural_key
        .iter()
        .filter_map(|key| columns.iter().position(|c| c.name == *key))
        .collect();
    let value_positions: Vec<usize> = (0..columns.len())
        .filter(|i| !key_positions.contains(i))
        .collect();

    let update_sql = format!(
        "UPDATE {} SET {} WHERE {}",
        schema.name,
        value_positions
            .iter()
            .map(|&i| format!("{} = {}", columns[i].name, placeholder(columns[i])))
            .collect::<Vec<_>>()
            .join(", "),
        predicate
    );
    let insert_sql = format!(
        "INSERT INTO {table} ({cols}) SELECT {vals} WHERE NOT EXISTS (SELECT 1 FROM {table} WHERE {predicate})",
        table = schema.name,
        cols = columns.iter().map(|c| c.name).collect::<Vec<_>>().join(", "),
        vals = columns.iter().map(|c| placeholder(c)).collect::<Vec<_>>().join(", "),
        predicate = predicate
    );

    let rows = collapse_by_key(&batch.rows, &key_positions);
    if rows.len() < batch.rows.len() {
        debug!(
            table = schema.name,
            duplicates = batch.rows.len() - rows.len(),
            "Collapsed repeated natural keys"
        );
    }

    let update_rows = rows
        .iter()
        .map(|row| {
            let mut params = pick(row, &value_positions);
            params.extend(pick(row, &key_positions));
            params
        })
        .collect();
    let insert_rows = rows
        .iter()
        .map(|row| {
            let mut params = row.clone();
            params.extend(pick(row, &key_positions));
            params
        })
        .collect();

    Ok(vec![
        SqlStatement::batch(update_sql, update_rows),
        SqlStatement::batch(insert_sql, insert_rows),
    ])
}

/// Persists a built dimension batch and returns how many batch rows were
/// written. Creates the table if it does not exist yet.
#[instrument(skip(connector, batch), fields(table = schema.name, rows = batch.len()))]
pub async fn write_dimension(
    connector: &dyn Connector,
    schema: &TableSchema,
    batch: &Table,
    policy: DimensionPolicy,
) -> Result<usize, StarloadError> {
    if batch.is_empty() {
        info!("Empty batch, nothing to write");
        return Ok(0);
    }
    check_layout(schema, batch)?;
    bootstrap::ensure_table(connector, schema).await?;

    let statements = match policy {
        DimensionPolicy::Replace => {
            vec![delete_all_statement(schema), insert_statement(schema, batch)]
        }
        DimensionPolicy::Upsert => upsert_statements(schema, batch)?,
        DimensionPolicy::Append => vec![insert_statement(schema, batch)],
    };

    let affected = connector.execute_atomic(&statements).await?;
    debug!(affected, ?policy, "Dimension written");
    Ok(batch.len())
}

/// Plain append of an already conformed batch (facts, run log).
pub async fn append(
    connector: &dyn Connector,
    schema: &TableSchema,
    batch: &Table,
) -> Result<usize, StarloadError> {
    if batch.is_empty() {
        return Ok(0);
    }
    check_layout(schema, batch)?;
    connector
        .execute_atomic(&[insert_statement(schema, batch)])
        .await?;
    Ok(batch.len())
}

/// Swaps the table content for `batch` in one transaction.
pub async fn replace(
    connector: &dyn Connector,
    schema: &TableSchema,
    batch: &Table,
) -> Result<usize, StarloadError> {
    check_layout(schema, batch)?;
    let mut statements = vec![delete_all_statement(schema)];
    if !batch.is_empty() {
        statements.push(insert_statement(schema, batch));
    }
    connector.execute_atomic(&statements).await?;
    Ok(batch.len())
}

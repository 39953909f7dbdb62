// starload-core/src/domain/table.rs

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::error::DomainError;
use crate::domain::value::Value;
use crate::domain::warehouse::TableSchema;

/// Row-oriented batch with named columns.
///
/// This is the in-memory shape of everything the pipeline moves around:
/// source extracts, built dimension batches, fact batches, and tables read
/// back from the warehouse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Values of one column, top to bottom.
    pub fn column_values<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row.get(idx).unwrap_or(&Value::Null)))
    }

    /// Fails with [`DomainError::MissingColumn`] naming the first absent column.
    pub fn require_columns(&self, entity: &str, required: &[&str]) -> Result<(), DomainError> {
        for column in required {
            if !self.has_column(column) {
                return Err(DomainError::MissingColumn {
                    entity: entity.to_string(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn records(&self) -> impl Iterator<Item = RawRecord<'_>> {
        let index = self.index();
        self.rows.iter().map(move |row| RawRecord {
            index: index.clone(),
            row,
        })
    }

    fn index(&self) -> Arc<HashMap<String, usize>> {
        Arc::new(
            self.columns
                .iter()
                .enumerate()
                .map(|(i, c)| (c.to_ascii_lowercase(), i))
                .collect(),
        )
    }

    /// Builds a batch from conformed records, checking that every record
    /// yields exactly the schema's insertable columns, in declaration order.
    pub fn from_records<R, I>(schema: &TableSchema, records: I) -> Result<Self, DomainError>
    where
        R: Conformed,
        I: IntoIterator<Item = R>,
    {
        let columns: Vec<&'static str> = schema.insert_columns().map(|c| c.name).collect();
        let mut table = Table::new(columns.iter().map(|c| c.to_string()).collect());

        for record in records {
            let fields = record.into_fields();
            if fields.len() != columns.len()
                || fields.iter().zip(&columns).any(|((name, _), col)| name != col)
            {
                return Err(DomainError::SchemaMismatch {
                    table: schema.name.to_string(),
                    expected: columns.join(", "),
                    found: fields
                        .iter()
                        .map(|(n, _)| *n)
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
            table.rows.push(fields.into_iter().map(|(_, v)| v).collect());
        }

        Ok(table)
    }

    /// Keeps the rows for which `keep` returns true.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&RawRecord<'_>) -> bool,
    {
        let index = self.index();
        self.rows.retain(|row| {
            keep(&RawRecord {
                index: index.clone(),
                row,
            })
        });
    }
}

/// One source row, addressed by column name (case-insensitive).
#[derive(Debug, Clone)]
pub struct RawRecord<'a> {
    index: Arc<HashMap<String, usize>>,
    row: &'a [Value],
}

impl<'a> RawRecord<'a> {
    /// Cell by column name; absent columns read as null.
    pub fn get(&self, column: &str) -> &'a Value {
        self.index
            .get(&column.to_ascii_lowercase())
            .and_then(|&i| self.row.get(i))
            .unwrap_or(&Value::Null)
    }

    pub fn int(&self, column: &str) -> Option<i64> {
        self.get(column).as_i64()
    }

    pub fn float(&self, column: &str) -> Option<f64> {
        self.get(column).as_f64()
    }

    pub fn text(&self, column: &str) -> String {
        self.get(column).text_or_unspecified()
    }
}

/// A typed warehouse row that can be flattened into schema-ordered cells.
pub trait Conformed {
    fn into_fields(self) -> Vec<(&'static str, Value)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::with_rows(
            &["CustomerID", "FirstName"],
            vec![
                vec![Value::Int(1), Value::from("Ana")],
                vec![Value::Int(2), Value::Null],
            ],
        )
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = sample();
        let names: Vec<String> = table.records().map(|r| r.text("firstname")).collect();
        assert_eq!(names, vec!["Ana".to_string(), "Unspecified".to_string()]);
    }

    #[test]
    fn test_require_columns_names_missing_column() {
        let table = sample();
        let err = table
            .require_columns("customer", &["CustomerID", "LastName"])
            .err();
        assert!(matches!(
            err,
            Some(DomainError::MissingColumn { ref column, .. }) if column == "LastName"
        ));
    }

    #[test]
    fn test_retain_rows() {
        let mut table = sample();
        table.retain_rows(|r| r.int("CustomerID") == Some(2));
        assert_eq!(table.len(), 1);
    }
}

// starload-core/src/domain/validation.rs

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::domain::table::Table;
use crate::domain::value::NaturalKey;
use crate::domain::warehouse::{TableKind, TableSchema};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Violation {
    NullIdentifier { column: String, rows: usize },
    DuplicateSurrogateKey { column: String, values: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NullIdentifier { column, rows } => {
                write!(f, "{} null value(s) in identifier column '{}'", rows, column)
            }
            Violation::DuplicateSurrogateKey { column, values } => {
                write!(f, "{} duplicated value(s) in surrogate key '{}'", values, column)
            }
        }
    }
}

/// Advisory outcome; the caller decides what a failure means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub table: String,
    pub rows: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Checks a batch against the identifier roles declared in `schema`.
///
/// Only columns present in the batch are checked: built batches do not carry
/// surrogate keys yet, persisted tables do.
pub fn validate(schema: &TableSchema, table: &Table) -> ValidationReport {
    let mut violations = Vec::new();

    for column in schema.identifier_columns() {
        let Some(values) = table.column_values(column.name) else {
            continue;
        };
        let nulls = values.filter(|v| v.is_null()).count();
        if nulls > 0 {
            violations.push(Violation::NullIdentifier {
                column: column.name.to_string(),
                rows: nulls,
            });
        }
    }

    if schema.kind == TableKind::Dimension
        && let Some(sk) = schema.surrogate_key()
        && let Some(values) = table.column_values(sk.name)
    {
        let mut seen: HashMap<NaturalKey, usize> = HashMap::new();
        for key in values.filter_map(NaturalKey::from_value) {
            *seen.entry(key).or_default() += 1;
        }
        let duplicated = seen.values().filter(|&&n| n > 1).count();
        if duplicated > 0 {
            violations.push(Violation::DuplicateSurrogateKey {
                column: sk.name.to_string(),
                values: duplicated,
            });
        }
    }

    ValidationReport {
        table: schema.name.to_string(),
        rows: table.len(),
        violations,
    }
}

// starload-core/src/domain/warehouse/schema.rs

use serde::Serialize;

/// Semantic role of a warehouse column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Generated by the warehouse on insert.
    SurrogateKey,
    /// Identifier carried over from the source system.
    NaturalKey,
    /// Surrogate key of another table (nullable when unresolved).
    ForeignKey,
    Attribute,
    Measure,
    /// Generation timestamp and similar bookkeeping.
    Audit,
}

impl ColumnRole {
    /// Identifier roles are the ones the validator null-checks.
    pub fn is_identifier(self) -> bool {
        matches!(
            self,
            ColumnRole::SurrogateKey | ColumnRole::NaturalKey | ColumnRole::ForeignKey
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SqlType {
    BigInt,
    Integer,
    Double,
    Varchar,
    Boolean,
    Date,
    Timestamp,
}

impl SqlType {
    pub fn as_sql(self) -> &'static str {
        match self {
            SqlType::BigInt => "BIGINT",
            SqlType::Integer => "INTEGER",
            SqlType::Double => "DOUBLE",
            SqlType::Varchar => "VARCHAR",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Date => "DATE",
            SqlType::Timestamp => "TIMESTAMP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub role: ColumnRole,
}

impl ColumnDef {
    pub const fn new(name: &'static str, sql_type: SqlType, role: ColumnRole) -> Self {
        Self {
            name,
            sql_type,
            role,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Dimension,
    Fact,
    Log,
}

/// Explicit declaration of a warehouse table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub name: &'static str,
    pub kind: TableKind,
    pub columns: &'static [ColumnDef],
    /// Column set that identifies a row in the source system.
    /// The upsert writer relies on it being unique.
    pub natural_key: &'static [&'static str],
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn surrogate_key(&self) -> Option<&ColumnDef> {
        self.columns
            .iter()
            .find(|c| c.role == ColumnRole::SurrogateKey)
    }

    /// Columns the loader writes; the surrogate key is left to the warehouse.
    pub fn insert_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns
            .iter()
            .filter(|c| c.role != ColumnRole::SurrogateKey)
    }

    pub fn identifier_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.role.is_identifier())
    }

    pub fn sequence_name(&self) -> Option<String> {
        self.surrogate_key()
            .map(|sk| format!("seq_{}_{}", self.name, sk.name))
    }
}

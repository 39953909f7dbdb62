// starload-core/src/domain/warehouse/mod.rs

pub mod catalog;
pub mod schema;

pub use schema::{ColumnDef, ColumnRole, SqlType, TableKind, TableSchema};

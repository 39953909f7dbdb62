// starload-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Source column '{column}' is missing for {entity}")]
    #[diagnostic(
        code(starload::domain::missing_column),
        help("Check the extraction query for '{entity}' against the source schema.")
    )]
    MissingColumn { entity: String, column: String },

    #[error("Rows built for '{table}' do not match its declared columns")]
    #[diagnostic(
        code(starload::domain::schema_mismatch),
        help("Expected [{expected}], found [{found}].")
    )]
    SchemaMismatch {
        table: String,
        expected: String,
        found: String,
    },

    #[error("Table '{0}' is not part of the warehouse catalog")]
    #[diagnostic(code(starload::domain::unknown_table))]
    UnknownTable(String),

    #[error("Table '{0}' does not exist")]
    #[diagnostic(
        code(starload::domain::table_not_found),
        help("Use `schema.table` for source tables, e.g. `Sales.Customer`.")
    )]
    TableNotFound(String),

    #[error("Freshness check failed: {0}")]
    #[diagnostic(
        code(starload::domain::freshness),
        help("Set `on_freshness_error: proceed` to load anyway when the watermark cannot be read.")
    )]
    FreshnessUnavailable(String),

    #[error("Invalid setting: {0}")]
    #[diagnostic(code(starload::domain::config))]
    InvalidSetting(String),
}

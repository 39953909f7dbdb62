// starload-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

/// Failures raised by the DuckDB adapter, for the source and the warehouse alike.
#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB error: {0}")]
    #[diagnostic(
        code(starload::infra::database::duckdb),
        help("Check that source.path and warehouse.path point to DuckDB files.")
    )]
    DuckDB(#[from] duckdb::Error),

    #[error("Statement failed: {message}\n    Query: {sql}")]
    #[diagnostic(code(starload::infra::database::statement))]
    Statement { sql: String, message: String },
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    #[error("I/O error: {0}")]
    #[diagnostic(
        code(starload::infra::io),
        help("The project directory and its target path must be writable.")
    )]
    Io(#[from] std::io::Error),

    // --- starload.yaml ---
    #[error("Invalid starload.yaml: {0}")]
    #[diagnostic(
        code(starload::infra::yaml),
        help("Policies are lowercase (upsert, incremental, ...) and dates are YYYY-MM-DD.")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Could not serialize run results: {0}")]
    #[diagnostic(code(starload::infra::json))]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(starload::infra::config))]
    ConfigError(String),

    #[error("No project configuration in {0}")]
    #[diagnostic(
        code(starload::infra::config_missing),
        help("Run `starload init` to scaffold a starload.yaml.")
    )]
    ConfigNotFound(String),
}

impl From<duckdb::Error> for InfrastructureError {
    fn from(err: duckdb::Error) -> Self {
        DatabaseError::DuckDB(err).into()
    }
}

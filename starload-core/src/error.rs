// starload-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StarloadError {
    // --- DOMAIN (conformance rules, catalog, settings) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE (database, IO, parsing) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- APPLICATION ---
    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<StarloadError>,
    },

    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl StarloadError {
    pub fn in_stage(stage: &str, source: StarloadError) -> Self {
        StarloadError::Stage {
            stage: stage.to_string(),
            source: Box::new(source),
        }
    }
}

impl From<std::io::Error> for StarloadError {
    fn from(err: std::io::Error) -> Self {
        StarloadError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<duckdb::Error> for StarloadError {
    fn from(err: duckdb::Error) -> Self {
        StarloadError::Infrastructure(InfrastructureError::from(err))
    }
}

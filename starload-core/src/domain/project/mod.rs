// starload-core/src/domain/project/mod.rs

pub mod configuration;

pub use configuration::{
    DatabaseConfig, DimensionPolicy, EtlSettings, FactPolicy, FreshnessErrorPolicy,
    ProjectConfig, ValidationPolicy,
};

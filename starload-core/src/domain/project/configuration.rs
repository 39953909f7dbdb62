// starload-core/src/domain/project/configuration.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// How a dimension batch reaches its table.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DimensionPolicy {
    /// Delete everything, then append the batch.
    Replace,
    /// Update matching natural keys in place, insert the rest.
    #[default]
    Upsert,
    /// Plain insert; meant for the first load into an empty table.
    Append,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FactPolicy {
    /// Append only orders above the current watermark.
    #[default]
    Incremental,
    Replace,
}

/// What to do with a fact batch that fails validation.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Log the violations and load anyway.
    #[default]
    Proceed,
    /// Leave the fact table untouched for this run.
    Skip,
}

/// What to do when the freshness comparison cannot be evaluated.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessErrorPolicy {
    /// Assume there is new data.
    #[default]
    Proceed,
    Fail,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EtlSettings {
    /// Lower bound (inclusive) on order dates pulled from the source.
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    /// Reload dimensions on every run. They are always loaded when the
    /// customer dimension is still empty.
    #[serde(default = "default_true")]
    pub load_dimensions: bool,

    #[serde(default)]
    pub dimension_policy: DimensionPolicy,

    #[serde(default)]
    pub fact_policy: FactPolicy,

    #[serde(default)]
    pub on_validation_failure: ValidationPolicy,

    #[serde(default)]
    pub on_freshness_error: FreshnessErrorPolicy,

    /// Dimension extract/build tasks in flight at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for EtlSettings {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            load_dimensions: true,
            dimension_policy: DimensionPolicy::default(),
            fact_policy: FactPolicy::default(),
            on_validation_failure: ValidationPolicy::default(),
            on_freshness_error: FreshnessErrorPolicy::default(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl EtlSettings {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_concurrency == 0 {
            return Err(DomainError::InvalidSetting(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DatabaseConfig {
    /// DuckDB file, relative to the project directory, or `:memory:`.
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_source")]
    pub source: DatabaseConfig,

    #[serde(default = "default_warehouse")]
    pub warehouse: DatabaseConfig,

    #[serde(rename = "target-path", default = "default_target_path")]
    pub target_path: String,

    #[serde(default)]
    pub etl: EtlSettings,
}

impl ProjectConfig {
    /// Project with every setting at its default.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: default_version(),
            source: default_source(),
            warehouse: default_warehouse(),
            target_path: default_target_path(),
            etl: EtlSettings::default(),
        }
    }
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2011, 1, 1).unwrap_or_default()
}
fn default_true() -> bool {
    true
}
fn default_max_concurrency() -> usize {
    4
}
fn default_version() -> String {
    "0.1.0".to_string()
}
fn default_source() -> DatabaseConfig {
    DatabaseConfig {
        path: "adventureworks.duckdb".to_string(),
    }
}
fn default_warehouse() -> DatabaseConfig {
    DatabaseConfig {
        path: "warehouse.duckdb".to_string(),
    }
}
fn default_target_path() -> String {
    "target".to_string()
}

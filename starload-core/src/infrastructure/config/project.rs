// starload-core/src/infrastructure/config/project.rs

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::project::configuration::{DatabaseConfig, ProjectConfig};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::write_yaml;

pub const CONFIG_FILE: &str = "starload.yaml";
const CANDIDATES: [&str; 2] = [CONFIG_FILE, "starload_project.yaml"];

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project config");

    let content = fs::read_to_string(&config_path)?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;

    // STARLOAD_START_DATE=2013-01-01 starload run
    apply_overrides(&mut config, |key| std::env::var(key).ok())?;

    config
        .etl
        .validate()
        .map_err(|e| InfrastructureError::ConfigError(e.to_string()))?;

    Ok(config)
}

pub fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "{:?} (checked: {:?})",
        root, CANDIDATES
    )))
}

/// Writes a default `starload.yaml`. An existing file is left alone and
/// `None` is returned.
pub fn scaffold_project(
    project_dir: &Path,
    name: &str,
) -> Result<Option<PathBuf>, InfrastructureError> {
    if find_main_config(project_dir).is_ok() {
        return Ok(None);
    }

    fs::create_dir_all(project_dir)?;
    let path = project_dir.join(CONFIG_FILE);
    write_yaml(&path, &ProjectConfig::named(name))?;
    info!(path = ?path, "Project config created");

    Ok(Some(path))
}

/// Location handed to the database adapter: project-relative paths are
/// anchored at the project directory, `:memory:` passes through.
pub fn database_location(project_dir: &Path, db: &DatabaseConfig) -> String {
    if db.path == ":memory:" || Path::new(&db.path).is_absolute() {
        return db.path.clone();
    }
    project_dir.join(&db.path).to_string_lossy().into_owned()
}

pub(crate) fn apply_overrides<F>(
    config: &mut ProjectConfig,
    lookup: F,
) -> Result<(), InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("STARLOAD_START_DATE") {
        let date = NaiveDate::parse_from_str(val.trim(), "%Y-%m-%d").map_err(|e| {
            InfrastructureError::ConfigError(format!("STARLOAD_START_DATE '{}': {}", val, e))
        })?;
        info!(old = %config.etl.start_date, new = %date, "Overriding start date via ENV");
        config.etl.start_date = date;
    }
    if let Some(val) = lookup("STARLOAD_SOURCE_PATH") {
        info!(old = ?config.source.path, new = ?val, "Overriding source path via ENV");
        config.source.path = val;
    }
    if let Some(val) = lookup("STARLOAD_WAREHOUSE_PATH") {
        info!(old = ?config.warehouse.path, new = ?val, "Overriding warehouse path via ENV");
        config.warehouse.path = val;
    }
    if let Some(val) = lookup("STARLOAD_TARGET_PATH") {
        info!(old = ?config.target_path, new = ?val, "Overriding target path via ENV");
        config.target_path = val;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_is_reported() -> Result<()> {
        let dir = tempdir()?;
        let err = load_project_config(dir.path()).err();
        assert!(matches!(err, Some(InfrastructureError::ConfigNotFound(_))));
        Ok(())
    }

    #[test]
    fn test_scaffold_then_load() -> Result<()> {
        let dir = tempdir()?;
        let created = scaffold_project(dir.path(), "sales_dw")?;
        assert_eq!(created, Some(dir.path().join(CONFIG_FILE)));

        // Second call keeps the existing file
        assert_eq!(scaffold_project(dir.path(), "other")?, None);

        let config = load_project_config(dir.path())?;
        assert_eq!(config.name, "sales_dw");
        assert_eq!(config.warehouse.path, "warehouse.duckdb");
        Ok(())
    }

    #[test]
    fn test_alternate_file_name() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("starload_project.yaml"),
            "name: alt\netl:\n  max_concurrency: 2\n",
        )?;
        let config = load_project_config(dir.path())?;
        assert_eq!(config.name, "alt");
        assert_eq!(config.etl.max_concurrency, 2);
        Ok(())
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("STARLOAD_START_DATE", "2013-07-01"),
            ("STARLOAD_WAREHOUSE_PATH", ":memory:"),
        ]);
        let mut config = ProjectConfig::named("dw");
        apply_overrides(&mut config, |k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.etl.start_date, NaiveDate::from_ymd_opt(2013, 7, 1).unwrap());
        assert_eq!(config.warehouse.path, ":memory:");
        assert_eq!(config.source.path, "adventureworks.duckdb");
    }

    #[test]
    fn test_bad_start_date_override() {
        let mut config = ProjectConfig::named("dw");
        let result = apply_overrides(&mut config, |k| {
            (k == "STARLOAD_START_DATE").then(|| "July 1st".to_string())
        });
        assert!(matches!(result, Err(InfrastructureError::ConfigError(_))));
    }

    #[test]
    fn test_database_location() {
        let root = Path::new("/projects/dw");
        let relative = DatabaseConfig {
            path: "data/warehouse.duckdb".to_string(),
        };
        let memory = DatabaseConfig {
            path: ":memory:".to_string(),
        };
        assert_eq!(
            database_location(root, &relative),
            "/projects/dw/data/warehouse.duckdb"
        );
        assert_eq!(database_location(root, &memory), ":memory:");
    }
}

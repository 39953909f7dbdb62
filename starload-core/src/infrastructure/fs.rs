// starload-core/src/infrastructure/fs.rs
//
// Project artifacts (run_results.json, starload.yaml) are replaced through a
// sibling temp file, so readers never see a half-written file.

use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::infrastructure::error::InfrastructureError;

pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(content.as_ref())?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Pretty-printed JSON artifact.
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<(), InfrastructureError> {
    let content = serde_json::to_string_pretty(data)?;
    atomic_write(path, content)
}

pub fn write_yaml<T: Serialize>(path: &Path, data: &T) -> Result<(), InfrastructureError> {
    let content = serde_yaml::to_string(data)?;
    atomic_write(path, content)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Serialize)]
    struct Summary {
        rows: u64,
        status: &'static str,
    }

    #[test]
    fn test_replaces_previous_artifact() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("run_results.json");

        write_json(&path, &Summary { rows: 1, status: "success" })?;
        write_json(&path, &Summary { rows: 7, status: "no_new_data" })?;

        let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(parsed["rows"], 7);
        assert_eq!(parsed["status"], "no_new_data");
        // Only the artifact is left behind
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_an_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("target").join("run_results.json");
        let result = atomic_write(&path, "{}");
        assert!(matches!(result, Err(InfrastructureError::Io(_))));
    }

    #[test]
    fn test_yaml_artifact() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("starload.yaml");
        write_yaml(&path, &Summary { rows: 3, status: "success" })?;
        assert!(fs::read_to_string(&path)?.contains("rows: 3"));
        Ok(())
    }
}

// starload/src/commands/init.rs
//
// USE CASE: Scaffold a project and create the empty warehouse.

use anyhow::Context;
use std::path::PathBuf;

use starload_core::application::bootstrap_warehouse;
use starload_core::infrastructure::config::scaffold_project;

use super::{load_config, open_database};

pub async fn execute(project_dir: PathBuf, name: Option<String>) -> anyhow::Result<()> {
    let name = name.unwrap_or_else(|| {
        project_dir
            .canonicalize()
            .unwrap_or_else(|_| project_dir.clone())
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sales_dw".to_string())
    });

    match scaffold_project(&project_dir, &name)
        .with_context(|| format!("Failed to write project config in {:?}", project_dir))?
    {
        Some(path) => println!("📝 Created {}", path.display()),
        None => println!("📝 Project config already present, keeping it."),
    }

    let config = load_config(&project_dir)?;
    let warehouse = open_database(&project_dir, &config.warehouse)?;

    println!("🏗️  Creating warehouse tables...");
    let created = bootstrap_warehouse(&warehouse)
        .await
        .context("Failed to create warehouse tables")?;

    println!("✨ Warehouse ready ({} tables created).", created);
    Ok(())
}

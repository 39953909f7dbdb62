// starload/src/commands/status.rs
//
// USE CASE: Show what the warehouse currently holds.

use std::path::{Path, PathBuf};

use starload_core::application::run_log;
use starload_core::application::warehouse_status;
use starload_core::infrastructure::config::database_location;

use super::{grid, load_config, open_database, table_grid};

pub async fn execute(project_dir: PathBuf, history: usize) -> anyhow::Result<()> {
    let config = load_config(&project_dir)?;

    let location = database_location(&project_dir, &config.warehouse);
    if location != ":memory:" && !Path::new(&location).exists() {
        anyhow::bail!(
            "❌ Warehouse not found at: {}\n👉 Have you run 'starload init'?",
            location
        );
    }
    let warehouse = open_database(&project_dir, &config.warehouse)?;

    let status = warehouse_status(&warehouse).await?;
    let mut counts = grid(["Table", "Kind", "Rows"]);
    for table in &status.tables {
        let rows = table
            .rows
            .map_or_else(|| "missing".to_string(), |n| n.to_string());
        counts.add_row(vec![
            table.table.to_string(),
            format!("{:?}", table.kind).to_lowercase(),
            rows,
        ]);
    }
    println!("\n📊 Warehouse: {}", location);
    println!("{counts}");
    println!("   Total rows (dimensions + facts): {}", status.total());

    let log = run_log::recent(&warehouse, history).await?;
    if log.is_empty() {
        println!("\n📜 No runs recorded yet.");
    } else {
        println!("\n📜 Last {} run log entries:", log.len());
        println!("{}", table_grid(&log));
    }

    Ok(())
}

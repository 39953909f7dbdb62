// starload/src/commands/mod.rs

pub mod init;
pub mod inspect;
pub mod metrics;
pub mod run;
pub mod status;

use anyhow::Context;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table as Grid};
use std::path::Path;

use starload_core::domain::project::{DatabaseConfig, ProjectConfig};
use starload_core::domain::table::Table;
use starload_core::infrastructure::adapters::duckdb::DuckDBConnector;
use starload_core::infrastructure::config::{database_location, load_project_config};

/// Loads `starload.yaml`, rendering config diagnostics with miette.
pub(crate) fn load_config(project_dir: &Path) -> anyhow::Result<ProjectConfig> {
    println!("⚙️  Loading configuration...");
    match load_project_config(project_dir) {
        Ok(config) => {
            println!("   Project: {} (v{})", config.name, config.version);
            Ok(config)
        }
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            anyhow::bail!(
                "Failed to load project configuration from {:?}",
                project_dir
            )
        }
    }
}

pub(crate) fn open_database(
    project_dir: &Path,
    db: &DatabaseConfig,
) -> anyhow::Result<DuckDBConnector> {
    let location = database_location(project_dir, db);
    DuckDBConnector::new(&location)
        .with_context(|| format!("Failed to open DuckDB at {}", location))
}

pub(crate) fn grid<I, S>(header: I) -> Grid
where
    I: IntoIterator<Item = S>,
    S: Into<comfy_table::Cell>,
{
    let mut grid = Grid::new();
    grid.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    grid
}

/// Renders a query result as-is, one cell per value.
pub(crate) fn table_grid(table: &Table) -> Grid {
    let mut out = grid(table.columns.iter().map(String::as_str));
    for row in &table.rows {
        out.add_row(row.iter().map(|v| v.to_string()));
    }
    out
}

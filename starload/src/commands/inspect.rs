// starload/src/commands/inspect.rs
//
// USE CASE: Inspect a DuckDB table (schema + sample rows).

use std::path::Path;

use starload_core::application::preview_table;
use starload_core::domain::warehouse::catalog;
use starload_core::infrastructure::adapters::duckdb::DuckDBConnector;
use starload_core::ports::connector::Connector;

use super::{grid, table_grid};

pub async fn execute(db_path: String, table: String, limit: usize) -> anyhow::Result<()> {
    if !Path::new(&db_path).exists() {
        anyhow::bail!(
            "❌ Database not found at: {}\n👉 Have you run 'starload init' or 'starload run'?",
            db_path
        );
    }

    let conn = DuckDBConnector::new(&db_path)?;

    println!("\n🔍 Inspecting Table: '{}'", table);

    let rows = preview_table(&conn, &table, limit).await?;
    let columns = conn.fetch_columns(&table).await?;
    // Warehouse tables also show the declared role of each column
    let declared = catalog::find(&table);
    let mut schema = grid(["Column", "Type", "Nullable", "Role"]);
    for column in &columns {
        let role = declared
            .and_then(|t| t.column(&column.name))
            .map_or_else(|| "-".to_string(), |c| format!("{:?}", c.role));
        schema.add_row(vec![
            column.name.clone(),
            column.data_type.clone(),
            if column.is_nullable { "yes" } else { "no" }.to_string(),
            role,
        ]);
    }
    println!("{schema}");

    println!("   --- Rows (Limit {}) ---", limit);
    println!("{}", table_grid(&rows));

    Ok(())
}

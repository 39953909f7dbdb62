// starload/src/commands/run.rs
//
// USE CASE: Refresh the warehouse from the source system.

use anyhow::Context;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use starload_core::application::{RefreshContext, RunReport, run_refresh};
use starload_core::domain::project::{DimensionPolicy, FactPolicy, ProjectConfig};
use starload_core::domain::run_log::RunStatus;
use starload_core::infrastructure::config::database_location;
use starload_core::ports::clock::SystemClock;

use super::{grid, load_config, open_database};

/// Command-line overrides layered on top of `starload.yaml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub start_date: Option<NaiveDate>,
    pub full_refresh: bool,
    pub skip_dimensions: bool,
}

impl RunOptions {
    pub fn apply(&self, config: &mut ProjectConfig) {
        if let Some(date) = self.start_date {
            config.etl.start_date = date;
        }
        if self.full_refresh {
            config.etl.fact_policy = FactPolicy::Replace;
            config.etl.dimension_policy = DimensionPolicy::Replace;
            config.etl.load_dimensions = true;
        }
        if self.skip_dimensions {
            config.etl.load_dimensions = false;
        }
    }
}

pub async fn execute(project_dir: PathBuf, options: RunOptions) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Load the Config (Infra)
    let mut config = load_config(&project_dir)?;
    options.apply(&mut config);
    println!(
        "   Orders from {} | dimensions: {} | facts: {:?}",
        config.etl.start_date,
        if config.etl.load_dimensions {
            format!("{:?}", config.etl.dimension_policy)
        } else {
            "kept".to_string()
        },
        config.etl.fact_policy
    );

    // B. Open both ends
    let source_location = database_location(&project_dir, &config.source);
    if source_location != ":memory:" && !Path::new(&source_location).exists() {
        anyhow::bail!(
            "❌ Source database not found at: {}\n👉 Set 'source.path' in starload.yaml or STARLOAD_SOURCE_PATH.",
            source_location
        );
    }
    let source = open_database(&project_dir, &config.source)
        .context("Failed to open the source database")?;
    let warehouse = open_database(&project_dir, &config.warehouse)
        .context("Failed to open the warehouse")?;
    println!("   Engine: DuckDB 🦆");

    // C. Run the refresh (Application Layer)
    println!("🚀 Refreshing warehouse...");
    let clock = SystemClock;
    let ctx = RefreshContext {
        source: &source,
        warehouse: &warehouse,
        clock: &clock,
    };

    match run_refresh(ctx, &config, &project_dir).await {
        Ok(report) => {
            print_report(&report);
            match report.status {
                RunStatus::NoNewData => println!(
                    "\n✅ Warehouse already up to date ({:.2?}).",
                    start.elapsed()
                ),
                _ => println!("\n✨ SUCCESS! Refresh finished in {:.2?}", start.elapsed()),
            }
        }
        Err(e) => {
            eprintln!("\n💥 REFRESH FAILED: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    if !report.dimensions.is_empty() {
        let mut dims = grid(["Dimension", "Extracted", "Written"]);
        for load in &report.dimensions {
            dims.add_row(vec![
                load.table.to_string(),
                load.extracted.to_string(),
                load.written.to_string(),
            ]);
        }
        println!("{dims}");
    }

    if !report.facts.is_empty() {
        let mut facts = grid(["Fact", "Status", "Built", "Written", "Violations"]);
        for outcome in &report.facts {
            let (built, written) = outcome
                .load
                .as_ref()
                .map_or((0, 0), |l| (l.built, l.written));
            facts.add_row(vec![
                outcome.process.to_string(),
                outcome.status.as_str().to_string(),
                built.to_string(),
                written.to_string(),
                outcome.validation.violations.len().to_string(),
            ]);
        }
        println!("{facts}");
    }

    let before = report.status_before.total();
    let after = report.status_after.total();
    println!(
        "   Warehouse rows: {} -> {} ({} dimension, {} fact rows written)",
        before,
        after,
        report.dimension_rows_written(),
        report.fact_rows_written()
    );
}

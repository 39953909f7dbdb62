// End-to-end refresh against a small AdventureWorks-shaped source.

#![allow(clippy::unwrap_used)]

use anyhow::Result;
use starload_core::application::pipeline::RUN_RESULTS_FILE;
use starload_core::application::{RefreshContext, RunReport, run_refresh};
use starload_core::domain::project::ProjectConfig;
use starload_core::domain::run_log::RunStatus;
use starload_core::domain::table::Table;
use starload_core::domain::value::Value;
use starload_core::infrastructure::adapters::duckdb::DuckDBConnector;
use starload_core::ports::clock::FixedClock;
use starload_core::ports::connector::Connector;
use std::path::Path;
use tempfile::tempdir;

const FIXTURE: &str = include_str!("fixtures/adventureworks_mini.sql");

async fn source() -> Result<DuckDBConnector> {
    let source = DuckDBConnector::new(":memory:")?;
    source.execute(FIXTURE).await?;
    Ok(source)
}

async fn refresh(
    source: &DuckDBConnector,
    warehouse: &DuckDBConnector,
    project_dir: &Path,
) -> Result<RunReport> {
    let clock = FixedClock::on(2024, 1, 15).unwrap();
    let ctx = RefreshContext {
        source,
        warehouse,
        clock: &clock,
    };
    let mut config = ProjectConfig::named("adventure_dw");
    config.etl.start_date = chrono::NaiveDate::from_ymd_opt(2013, 1, 1).unwrap();
    Ok(run_refresh(ctx, &config, project_dir).await?)
}

async fn count(conn: &DuckDBConnector, table: &str) -> Result<i64> {
    let result = conn
        .query(&format!("SELECT COUNT(*) AS n FROM {}", table), &[])
        .await?;
    Ok(result.records().next().and_then(|r| r.int("n")).unwrap_or(-1))
}

async fn single_row(conn: &DuckDBConnector, sql: &str) -> Result<Table> {
    let table = conn.query(sql, &[]).await?;
    assert_eq!(table.len(), 1, "expected one row for: {}", sql);
    Ok(table)
}

fn close(actual: Option<f64>, expected: f64) -> bool {
    actual.is_some_and(|a| (a - expected).abs() < 1e-6)
}

#[tokio::test]
async fn test_first_run_loads_the_star() -> Result<()> {
    let dir = tempdir()?;
    let source = source().await?;
    let warehouse = DuckDBConnector::new(":memory:")?;

    let report = refresh(&source, &warehouse, dir.path()).await?;
    assert_eq!(report.status, RunStatus::Success);
    assert!(report.dimensions_loaded);

    assert_eq!(count(&warehouse, "dim_date").await?, 3652);
    assert_eq!(count(&warehouse, "dim_customer").await?, 3);
    assert_eq!(count(&warehouse, "dim_product").await?, 2);
    assert_eq!(count(&warehouse, "dim_territory").await?, 2);
    assert_eq!(count(&warehouse, "dim_currency").await?, 2);
    assert_eq!(count(&warehouse, "dim_employee").await?, 2);
    assert_eq!(count(&warehouse, "dim_reseller").await?, 1);
    assert_eq!(count(&warehouse, "dim_sales_reason").await?, 2);
    assert_eq!(count(&warehouse, "fact_internet_sales").await?, 3);
    assert_eq!(count(&warehouse, "fact_reseller_sales").await?, 2);

    assert!(dir.path().join("target").join(RUN_RESULTS_FILE).exists());
    Ok(())
}

#[tokio::test]
async fn test_measures_and_lookups() -> Result<()> {
    let dir = tempdir()?;
    let source = source().await?;
    let warehouse = DuckDBConnector::new(":memory:")?;
    refresh(&source, &warehouse, dir.path()).await?;

    let helmet = single_row(
        &warehouse,
        "SELECT discount_amount, net_sales_amount, profit, customer_key, product_key, date_key
         FROM fact_internet_sales WHERE sales_order_id = 43698",
    )
    .await?;
    let row = helmet.records().next().unwrap();
    assert!(close(row.float("discount_amount"), 6.998));
    assert!(close(row.float("net_sales_amount"), 55.984));
    assert!(close(row.float("profit"), 29.8114));
    assert!(row.int("customer_key").is_some());
    assert!(row.int("product_key").is_some());
    assert!(row.int("date_key").is_some());

    // Unknown product: the line is kept with a null key and no profit
    let orphan = single_row(
        &warehouse,
        "SELECT product_key, profit FROM fact_internet_sales WHERE sales_order_id = 43699",
    )
    .await?;
    let row = orphan.records().next().unwrap();
    assert_eq!(row.get("product_key"), &Value::Null);
    assert_eq!(row.get("profit"), &Value::Null);

    let reseller = single_row(
        &warehouse,
        "SELECT COUNT(*) AS n FROM fact_reseller_sales
         WHERE reseller_key IS NOT NULL AND employee_key IS NOT NULL",
    )
    .await?;
    assert_eq!(reseller.records().next().unwrap().int("n"), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_rerun_without_new_orders_loads_nothing() -> Result<()> {
    let dir = tempdir()?;
    let source = source().await?;
    let warehouse = DuckDBConnector::new(":memory:")?;
    refresh(&source, &warehouse, dir.path()).await?;

    let report = refresh(&source, &warehouse, dir.path()).await?;
    assert_eq!(report.status, RunStatus::NoNewData);
    assert!(report.facts.is_empty());
    assert_eq!(count(&warehouse, "fact_internet_sales").await?, 3);

    let log = warehouse
        .query(
            "SELECT status FROM etl_log WHERE process_name = 'etl_run' ORDER BY log_id DESC LIMIT 1",
            &[],
        )
        .await?;
    assert_eq!(
        log.records().next().map(|r| r.text("status")),
        Some("no_new_data".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_new_order_is_appended_once() -> Result<()> {
    let dir = tempdir()?;
    let source = source().await?;
    let warehouse = DuckDBConnector::new(":memory:")?;
    refresh(&source, &warehouse, dir.path()).await?;

    source
        .execute(
            "INSERT INTO Sales.SalesOrderHeader VALUES
                (43700, TIMESTAMP '2013-07-03 00:00:00', 11001, NULL, 1, 1, 2.8, 0.875);
             INSERT INTO Sales.SalesOrderDetail VALUES
                (43700, 103, 707, 1, 34.99, 0.0, 34.99);",
        )
        .await?;

    let report = refresh(&source, &warehouse, dir.path()).await?;
    assert_eq!(report.status, RunStatus::Success);
    assert_eq!(count(&warehouse, "fact_internet_sales").await?, 4);
    assert_eq!(count(&warehouse, "fact_reseller_sales").await?, 2);

    // Dimensions are upserted, not duplicated
    assert_eq!(count(&warehouse, "dim_customer").await?, 3);
    assert_eq!(count(&warehouse, "dim_date").await?, 3652);
    assert_eq!(count(&warehouse, "dim_sales_reason").await?, 2);

    let reseller = report
        .facts
        .iter()
        .find(|f| f.process == "reseller_sales")
        .map(|f| f.status);
    assert_eq!(reseller, Some(RunStatus::NoNewData));
    assert_eq!(report.fact_rows_written(), 1);
    Ok(())
}

// starload-core/src/application/freshness.rs

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::application::extract::SourceExtractor;
use crate::domain::error::DomainError;
use crate::domain::project::FreshnessErrorPolicy;
use crate::domain::warehouse::catalog;
use crate::domain::watermark::Freshness;
use crate::error::StarloadError;
use crate::ports::connector::Connector;

/// Latest `order_date` across every fact table that exists.
pub async fn destination_watermark(
    warehouse: &dyn Connector,
) -> Result<Option<NaiveDate>, StarloadError> {
    let mut latest: Option<NaiveDate> = None;
    for schema in catalog::FACTS {
        if !warehouse.table_exists(schema.name).await? {
            continue;
        }
        let table = warehouse
            .query(
                &format!("SELECT MAX(order_date) AS last_loaded_date FROM {}", schema.name),
                &[],
            )
            .await?;
        let loaded = table
            .records()
            .next()
            .and_then(|r| r.get("last_loaded_date").as_date());
        latest = latest.max(loaded);
    }
    Ok(latest)
}

/// An empty warehouse always needs a load; the source is only probed once
/// some fact data exists.
async fn compare(
    source: &dyn Connector,
    warehouse: &dyn Connector,
) -> Result<Freshness, StarloadError> {
    let Some(destination_date) = destination_watermark(warehouse).await? else {
        return Ok(Freshness::FirstLoad { source: None });
    };
    let source_date = SourceExtractor::new(source).max_order_date().await?;
    Ok(Freshness::compare(source_date, Some(destination_date)))
}

/// Decides whether the source holds orders the warehouse has not seen.
#[instrument(skip(source, warehouse))]
pub async fn check_freshness(
    source: &dyn Connector,
    warehouse: &dyn Connector,
    on_error: FreshnessErrorPolicy,
) -> Result<Freshness, StarloadError> {
    match compare(source, warehouse).await {
        Ok(verdict) => {
            info!(?verdict, "Freshness evaluated");
            Ok(verdict)
        }
        Err(e) => match on_error {
            FreshnessErrorPolicy::Proceed => {
                warn!(error = %e, "Freshness check failed, assuming new data");
                Ok(Freshness::Unknown {
                    reason: e.to_string(),
                })
            }
            FreshnessErrorPolicy::Fail => {
                Err(DomainError::FreshnessUnavailable(e.to_string()).into())
            }
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::bootstrap;
    use crate::infrastructure::adapters::duckdb::DuckDBConnector;
    use anyhow::Result;

    async fn source_until(day: &str) -> Result<DuckDBConnector> {
        let source = DuckDBConnector::new(":memory:")?;
        source
            .execute(&format!(
                "CREATE SCHEMA Sales;
                 CREATE TABLE Sales.SalesOrderHeader (SalesOrderID INTEGER, OrderDate TIMESTAMP);
                 INSERT INTO Sales.SalesOrderHeader VALUES (1, TIMESTAMP '{} 08:00:00');",
                day
            ))
            .await?;
        Ok(source)
    }

    #[tokio::test]
    async fn test_no_fact_tables_means_new_data() -> Result<()> {
        let source = source_until("2014-06-30").await?;
        let warehouse = DuckDBConnector::new(":memory:")?;

        let verdict = check_freshness(&source, &warehouse, FreshnessErrorPolicy::Proceed).await?;
        assert_eq!(verdict, Freshness::FirstLoad { source: None });
        assert!(verdict.has_new_data());
        Ok(())
    }

    #[tokio::test]
    async fn test_loaded_through_source_date_is_up_to_date() -> Result<()> {
        let source = source_until("2014-06-30").await?;
        let warehouse = DuckDBConnector::new(":memory:")?;
        bootstrap::bootstrap_warehouse(&warehouse).await?;
        warehouse
            .execute(
                "INSERT INTO fact_reseller_sales (sales_order_id, sales_order_detail_id, order_date)
                 VALUES (1, 1, DATE '2014-06-30')",
            )
            .await?;

        assert_eq!(
            destination_watermark(&warehouse).await?,
            NaiveDate::from_ymd_opt(2014, 6, 30)
        );
        let verdict = check_freshness(&source, &warehouse, FreshnessErrorPolicy::Proceed).await?;
        assert!(!verdict.has_new_data());
        Ok(())
    }

    async fn loaded_until(day: &str) -> Result<DuckDBConnector> {
        let warehouse = DuckDBConnector::new(":memory:")?;
        bootstrap::bootstrap_warehouse(&warehouse).await?;
        warehouse
            .execute(&format!(
                "INSERT INTO fact_internet_sales (sales_order_id, sales_order_detail_id, order_date)
                 VALUES (1, 1, DATE '{}')",
                day
            ))
            .await?;
        Ok(warehouse)
    }

    #[tokio::test]
    async fn test_empty_warehouse_skips_broken_source() -> Result<()> {
        // No Sales schema: any source probe would fail
        let source = DuckDBConnector::new(":memory:")?;
        let warehouse = DuckDBConnector::new(":memory:")?;
        bootstrap::bootstrap_warehouse(&warehouse).await?;

        let verdict = check_freshness(&source, &warehouse, FreshnessErrorPolicy::Fail).await?;
        assert_eq!(verdict, Freshness::FirstLoad { source: None });
        assert!(verdict.has_new_data());
        Ok(())
    }

    #[tokio::test]
    async fn test_newer_source_date_is_new_data() -> Result<()> {
        let source = source_until("2014-07-01").await?;
        let warehouse = loaded_until("2014-06-30").await?;

        let verdict = check_freshness(&source, &warehouse, FreshnessErrorPolicy::Fail).await?;
        assert!(matches!(verdict, Freshness::NewData { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_same_day_orders_compare_at_day_grain() -> Result<()> {
        // Source timestamp is 08:00 on the loaded day
        let source = source_until("2014-06-30").await?;
        let warehouse = loaded_until("2014-06-30").await?;

        let verdict = check_freshness(&source, &warehouse, FreshnessErrorPolicy::Fail).await?;
        assert!(matches!(verdict, Freshness::UpToDate { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_query_failure_follows_policy() -> Result<()> {
        // No Sales schema: the source probe fails
        let source = DuckDBConnector::new(":memory:")?;
        let warehouse = loaded_until("2014-06-30").await?;

        let verdict = check_freshness(&source, &warehouse, FreshnessErrorPolicy::Proceed).await?;
        assert!(matches!(verdict, Freshness::Unknown { .. }));
        assert!(verdict.has_new_data());

        let strict = check_freshness(&source, &warehouse, FreshnessErrorPolicy::Fail).await;
        assert!(matches!(
            strict,
            Err(StarloadError::Domain(DomainError::FreshnessUnavailable(_)))
        ));
        Ok(())
    }
}

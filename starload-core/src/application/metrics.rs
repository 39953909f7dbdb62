// starload-core/src/application/metrics.rs

use tracing::warn;

use crate::domain::fact::FactKind;
use crate::domain::metrics::{SalesMetric, sales_metrics};
use crate::error::StarloadError;
use crate::ports::connector::Connector;

/// Aggregated sales per (date key, product key) for one loaded fact table.
/// A fact table that was never created yields no metrics.
pub async fn load_sales_metrics(
    connector: &dyn Connector,
    kind: FactKind,
) -> Result<Vec<SalesMetric>, StarloadError> {
    let schema = kind.schema();
    if !connector.table_exists(schema.name).await? {
        warn!(table = schema.name, "Fact table not loaded yet");
        return Ok(Vec::new());
    }

    let fact = connector
        .query(
            &format!(
                "SELECT date_key, product_key, order_quantity, line_total, discount_amount, \
                 net_sales_amount, profit FROM {}",
                schema.name
            ),
            &[],
        )
        .await?;

    Ok(sales_metrics(&fact)?)
}

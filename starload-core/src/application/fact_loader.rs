// starload-core/src/application/fact_loader.rs

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::application::{bootstrap, writer};
use crate::domain::fact::{DimensionLookup, FactDimensions, ORDER_ID};
use crate::domain::project::FactPolicy;
use crate::domain::table::Table;
use crate::domain::warehouse::{TableSchema, catalog};
use crate::domain::watermark::{WatermarkProbe, keep_after};
use crate::error::StarloadError;
use crate::ports::connector::Connector;

/// Reads MAX(order id) from a fact table. A missing table is a result, not an
/// error; any query failure propagates.
pub async fn probe_watermark(
    connector: &dyn Connector,
    schema: &TableSchema,
) -> Result<WatermarkProbe, StarloadError> {
    if !connector.table_exists(schema.name).await? {
        return Ok(WatermarkProbe::TableMissing);
    }
    let table = connector
        .query(
            &format!("SELECT MAX({}) AS max_id FROM {}", ORDER_ID, schema.name),
            &[],
        )
        .await?;

    Ok(table
        .records()
        .next()
        .and_then(|r| r.int("max_id"))
        .map_or(WatermarkProbe::Empty, WatermarkProbe::At))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactLoad {
    pub table: String,
    pub policy: FactPolicy,
    pub watermark: Option<WatermarkProbe>,
    /// Rows the builder produced.
    pub built: usize,
    /// Rows that reached the table.
    pub written: usize,
}

#[instrument(skip(connector, batch), fields(table = schema.name, rows = batch.len()))]
pub async fn load_fact(
    connector: &dyn Connector,
    schema: &TableSchema,
    mut batch: Table,
    policy: FactPolicy,
) -> Result<FactLoad, StarloadError> {
    let built = batch.len();

    let (watermark, written) = match policy {
        FactPolicy::Incremental => {
            let probe = probe_watermark(connector, schema).await?;
            if probe == WatermarkProbe::TableMissing {
                bootstrap::create_table(connector, schema).await?;
            }
            keep_after(&mut batch, ORDER_ID, probe);
            info!(watermark = ?probe, kept = batch.len(), "Incremental filter applied");
            (Some(probe), writer::append(connector, schema, &batch).await?)
        }
        FactPolicy::Replace => {
            bootstrap::ensure_table(connector, schema).await?;
            (None, writer::replace(connector, schema, &batch).await?)
        }
    };

    Ok(FactLoad {
        table: schema.name.to_string(),
        policy,
        watermark,
        built,
        written,
    })
}

async fn read_lookup(
    connector: &dyn Connector,
    schema: &TableSchema,
    attribute: Option<&str>,
) -> Result<DimensionLookup, StarloadError> {
    if !connector.table_exists(schema.name).await? {
        warn!(table = schema.name, "Dimension missing, its keys will not resolve");
        return Ok(DimensionLookup::default());
    }

    let mut columns: Vec<&str> = schema
        .surrogate_key()
        .map(|c| c.name)
        .into_iter()
        .chain(schema.natural_key.first().copied())
        .collect();
    columns.extend(attribute);

    let table = connector
        .query(
            &format!("SELECT {} FROM {}", columns.join(", "), schema.name),
            &[],
        )
        .await?;

    let lookup = match attribute {
        Some(attr) => DimensionLookup::with_attribute(schema, &table, attr)?,
        None => DimensionLookup::from_table(schema, &table)?,
    };
    Ok(lookup)
}

/// Current dimension keys, read from the warehouse.
pub async fn load_fact_dimensions(
    connector: &dyn Connector,
) -> Result<FactDimensions, StarloadError> {
    Ok(FactDimensions {
        customer: read_lookup(connector, &catalog::DIM_CUSTOMER, None).await?,
        product: read_lookup(connector, &catalog::DIM_PRODUCT, Some("standard_cost")).await?,
        date: read_lookup(connector, &catalog::DIM_DATE, None).await?,
        territory: read_lookup(connector, &catalog::DIM_TERRITORY, None).await?,
        reseller: read_lookup(connector, &catalog::DIM_RESELLER, None).await?,
        employee: read_lookup(connector, &catalog::DIM_EMPLOYEE, None).await?,
    })
}

// starload/src/commands/metrics.rs
//
// USE CASE: Aggregated sales metrics from a loaded fact table.

use std::cmp::Ordering;
use std::path::PathBuf;

use starload_core::application::load_sales_metrics;
use starload_core::domain::fact::FactKind;

use super::{grid, load_config, open_database};

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}%", v))
}

pub async fn execute(project_dir: PathBuf, kind: FactKind, limit: usize) -> anyhow::Result<()> {
    let config = load_config(&project_dir)?;
    let warehouse = open_database(&project_dir, &config.warehouse)?;

    let mut metrics = load_sales_metrics(&warehouse, kind).await?;
    if metrics.is_empty() {
        println!("📭 No {} loaded yet. Run 'starload run' first.", kind.process_name());
        return Ok(());
    }

    metrics.sort_by(|a, b| {
        b.net_sales_amount
            .partial_cmp(&a.net_sales_amount)
            .unwrap_or(Ordering::Equal)
    });

    let mut out = grid([
        "Date key",
        "Product key",
        "Qty",
        "Net sales",
        "Profit",
        "Avg sale",
        "Discount rate",
        "Profit margin",
    ]);
    for m in metrics.iter().take(limit) {
        out.add_row(vec![
            m.date_key.to_string(),
            m.product_key.to_string(),
            m.order_quantity.to_string(),
            format!("{:.2}", m.net_sales_amount),
            format!("{:.2}", m.profit),
            m.avg_sale_amount
                .map_or_else(|| "-".to_string(), |v| format!("{:.2}", v)),
            pct(m.discount_rate),
            pct(m.profit_margin),
        ]);
    }

    println!(
        "\n💰 {} ({} of {} date/product groups)",
        kind.process_name(),
        limit.min(metrics.len()),
        metrics.len()
    );
    println!("{out}");
    Ok(())
}

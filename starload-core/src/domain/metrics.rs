// starload-core/src/domain/metrics.rs

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::error::DomainError;
use crate::domain::table::Table;
use crate::domain::value::round_to;

const REQUIRED_COLUMNS: &[&str] = &[
    "date_key",
    "product_key",
    "order_quantity",
    "line_total",
    "discount_amount",
    "net_sales_amount",
    "profit",
];

/// Sales aggregated per (date key, product key).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesMetric {
    pub date_key: i64,
    pub product_key: i64,
    pub order_quantity: i64,
    pub line_total: f64,
    pub discount_amount: f64,
    pub net_sales_amount: f64,
    pub profit: f64,
    pub avg_sale_amount: Option<f64>,
    /// Percent of line total, 2 decimals.
    pub discount_rate: Option<f64>,
    /// Percent of net sales, 2 decimals.
    pub profit_margin: Option<f64>,
}

#[derive(Default)]
struct Totals {
    quantity: i64,
    line_total: f64,
    discount: f64,
    net: f64,
    profit: f64,
}

fn ratio(num: f64, den: f64) -> Option<f64> {
    (den != 0.0).then(|| num / den).filter(|v| v.is_finite())
}

/// Lines with an unresolved date or product key are left out; null measures
/// count as zero.
pub fn sales_metrics(fact: &Table) -> Result<Vec<SalesMetric>, DomainError> {
    fact.require_columns("sales metrics", REQUIRED_COLUMNS)?;

    let mut groups: BTreeMap<(i64, i64), Totals> = BTreeMap::new();
    for r in fact.records() {
        let (Some(date_key), Some(product_key)) = (r.int("date_key"), r.int("product_key")) else {
            continue;
        };
        let totals = groups.entry((date_key, product_key)).or_default();
        totals.quantity += r.int("order_quantity").unwrap_or(0);
        totals.line_total += r.float("line_total").unwrap_or(0.0);
        totals.discount += r.float("discount_amount").unwrap_or(0.0);
        totals.net += r.float("net_sales_amount").unwrap_or(0.0);
        totals.profit += r.float("profit").unwrap_or(0.0);
    }

    Ok(groups
        .into_iter()
        .map(|((date_key, product_key), t)| SalesMetric {
            date_key,
            product_key,
            order_quantity: t.quantity,
            line_total: t.line_total,
            discount_amount: t.discount,
            net_sales_amount: t.net,
            profit: t.profit,
            avg_sale_amount: ratio(t.line_total, t.quantity as f64),
            discount_rate: ratio(t.discount, t.line_total).map(|v| round_to(v * 100.0, 2)),
            profit_margin: ratio(t.profit, t.net).map(|v| round_to(v * 100.0, 2)),
        })
        .collect())
}

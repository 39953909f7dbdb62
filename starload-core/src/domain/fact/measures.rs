// starload-core/src/domain/fact/measures.rs

use crate::domain::table::RawRecord;

/// Line-level amounts carried by every sales fact.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SalesMeasures {
    pub order_quantity: Option<i64>,
    pub unit_price: Option<f64>,
    pub unit_price_discount: Option<f64>,
    pub line_total: Option<f64>,
    pub discount_amount: Option<f64>,
    pub net_sales_amount: Option<f64>,
    pub profit: Option<f64>,
    pub tax_amount: Option<f64>,
    pub freight_amount: Option<f64>,
}

impl SalesMeasures {
    /// discount = fraction * qty * price, net = line total - discount,
    /// profit = net - standard cost * qty. Any missing input leaves the
    /// dependent measures null.
    pub fn derive(
        order_quantity: Option<i64>,
        unit_price: Option<f64>,
        unit_price_discount: Option<f64>,
        line_total: Option<f64>,
        standard_cost: Option<f64>,
    ) -> Self {
        let qty = order_quantity.map(|q| q as f64);
        let discount_amount = match (unit_price_discount, qty, unit_price) {
            (Some(d), Some(q), Some(p)) => Some(d * q * p),
            _ => None,
        };
        let net_sales_amount = match (line_total, discount_amount) {
            (Some(total), Some(discount)) => Some(total - discount),
            _ => None,
        };
        let profit = match (net_sales_amount, standard_cost, qty) {
            (Some(net), Some(cost), Some(q)) => Some(net - cost * q),
            _ => None,
        };

        SalesMeasures {
            order_quantity,
            unit_price,
            unit_price_discount,
            line_total,
            discount_amount,
            net_sales_amount,
            profit,
            tax_amount: None,
            freight_amount: None,
        }
    }

    /// Reads the standard source columns of a sales line.
    pub fn from_line(line: &RawRecord<'_>, standard_cost: Option<f64>) -> Self {
        SalesMeasures {
            tax_amount: line.float("TaxAmt"),
            freight_amount: line.float("Freight"),
            ..Self::derive(
                line.int("OrderQty"),
                line.float("UnitPrice"),
                line.float("UnitPriceDiscount"),
                line.float("LineTotal"),
                standard_cost,
            )
        }
    }
}

// starload-core/src/domain/dimension/reference.rs
//
// Small lookup dimensions: currencies and sales reasons.

use chrono::NaiveDate;

use crate::domain::error::DomainError;
use crate::domain::table::{Conformed, Table};
use crate::domain::value::Value;

pub const CURRENCY: &str = "currency";
pub const CURRENCY_COLUMNS: &[&str] = &["CurrencyCode", "Name"];

pub const SALES_REASON: &str = "sales_reason";
pub const SALES_REASON_COLUMNS: &[&str] =
    &["SalesReasonID", "ReasonName", "ReasonType", "SalesOrderID"];

#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyRow {
    pub currency_code: String,
    pub currency_name: String,
    pub saved_date: NaiveDate,
}

impl Conformed for CurrencyRow {
    fn into_fields(self) -> Vec<(&'static str, Value)> {
        vec![
            ("currency_code", self.currency_code.into()),
            ("currency_name", self.currency_name.into()),
            ("saved_date", self.saved_date.into()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesReasonRow {
    pub sales_reason_id: Option<i64>,
    pub sales_order_id: Option<i64>,
    pub reason_name: String,
    pub reason_type: String,
    pub saved_date: NaiveDate,
}

impl Conformed for SalesReasonRow {
    fn into_fields(self) -> Vec<(&'static str, Value)> {
        vec![
            ("sales_reason_id", self.sales_reason_id.into()),
            ("sales_order_id", self.sales_order_id.into()),
            ("reason_name", self.reason_name.into()),
            ("reason_type", self.reason_type.into()),
            ("saved_date", self.saved_date.into()),
        ]
    }
}

pub fn build_currencies(raw: &Table, today: NaiveDate) -> Result<Vec<CurrencyRow>, DomainError> {
    raw.require_columns(CURRENCY, CURRENCY_COLUMNS)?;

    Ok(raw
        .records()
        .map(|r| CurrencyRow {
            currency_code: r.text("CurrencyCode"),
            currency_name: r.text("Name"),
            saved_date: today,
        })
        .collect())
}

pub fn build_sales_reasons(
    raw: &Table,
    today: NaiveDate,
) -> Result<Vec<SalesReasonRow>, DomainError> {
    raw.require_columns(SALES_REASON, SALES_REASON_COLUMNS)?;

    Ok(raw
        .records()
        .map(|r| SalesReasonRow {
            sales_reason_id: r.int("SalesReasonID"),
            sales_order_id: r.int("SalesOrderID"),
            reason_name: r.text("ReasonName"),
            reason_type: r.text("ReasonType"),
            saved_date: today,
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_rename() {
        let table = Table::with_rows(
            CURRENCY_COLUMNS,
            vec![vec!["EUR".into(), "EMU Euro".into()]],
        );
        let rows = build_currencies(&table, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).unwrap();
        assert_eq!(rows[0].currency_code, "EUR");
        assert_eq!(rows[0].currency_name, "EMU Euro");
    }

    #[test]
    fn test_sales_reason_keeps_order_link() {
        let table = Table::with_rows(
            SALES_REASON_COLUMNS,
            vec![vec![
                Value::Int(5),
                "Manufacturer".into(),
                "Other".into(),
                Value::Int(43697),
            ]],
        );
        let rows =
            build_sales_reasons(&table, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).unwrap();
        assert_eq!(rows[0].sales_order_id, Some(43697));
        assert_eq!(rows[0].reason_type, "Other");
    }
}

// starload-core/src/domain/fact/mod.rs
//
// Fact construction: each transaction line is left-joined to the persisted
// dimensions. Unresolved natural keys give a null surrogate key; the line is
// always kept.

pub mod lookup;
pub mod measures;

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::domain::error::DomainError;
use crate::domain::table::{Conformed, RawRecord, Table};
use crate::domain::value::Value;
use crate::domain::warehouse::{TableSchema, catalog};

pub use lookup::DimensionLookup;
pub use measures::SalesMeasures;

pub const ORDER_ID: &str = "sales_order_id";

const LINE_COLUMNS: &[&str] = &[
    "SalesOrderID",
    "SalesOrderDetailID",
    "OrderDate",
    "TerritoryID",
    "ProductID",
    "OrderQty",
    "UnitPrice",
    "UnitPriceDiscount",
    "LineTotal",
    "TaxAmt",
    "Freight",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKind {
    InternetSales,
    ResellerSales,
}

impl FactKind {
    pub const ALL: [FactKind; 2] = [FactKind::InternetSales, FactKind::ResellerSales];

    pub fn schema(self) -> &'static TableSchema {
        match self {
            FactKind::InternetSales => &catalog::FACT_INTERNET_SALES,
            FactKind::ResellerSales => &catalog::FACT_RESELLER_SALES,
        }
    }

    /// Process name used in the run log.
    pub fn process_name(self) -> &'static str {
        match self {
            FactKind::InternetSales => "internet_sales",
            FactKind::ResellerSales => "reseller_sales",
        }
    }

    pub fn required_columns(self) -> Vec<&'static str> {
        let mut columns = LINE_COLUMNS.to_vec();
        match self {
            FactKind::InternetSales => columns.push("CustomerID"),
            FactKind::ResellerSales => columns.extend(["StoreID", "SalesPersonID"]),
        }
        columns
    }

    pub fn build(
        self,
        lines: &Table,
        dims: &FactDimensions,
        today: NaiveDate,
    ) -> Result<Table, DomainError> {
        lines.require_columns(self.process_name(), &self.required_columns())?;
        let schema = self.schema();

        match self {
            FactKind::InternetSales => Table::from_records(
                schema,
                lines
                    .records()
                    .map(|line| InternetSalesRow::resolve(&line, dims, today)),
            ),
            FactKind::ResellerSales => Table::from_records(
                schema,
                lines
                    .records()
                    .map(|line| ResellerSalesRow::resolve(&line, dims, today)),
            ),
        }
    }
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.schema().name)
    }
}

/// Persisted dimensions, read fresh from the warehouse before a fact build.
#[derive(Debug, Clone, Default)]
pub struct FactDimensions {
    pub customer: DimensionLookup,
    /// Carries `standard_cost` per product key.
    pub product: DimensionLookup,
    pub date: DimensionLookup,
    pub territory: DimensionLookup,
    pub reseller: DimensionLookup,
    pub employee: DimensionLookup,
}

/// Keys and attributes shared by both sales facts.
#[derive(Debug, Clone, PartialEq)]
struct LineHeader {
    sales_order_id: Option<i64>,
    sales_order_detail_id: Option<i64>,
    product_key: Option<i64>,
    date_key: Option<i64>,
    territory_key: Option<i64>,
    order_date: Option<NaiveDate>,
    measures: SalesMeasures,
}

impl LineHeader {
    fn resolve(line: &RawRecord<'_>, dims: &FactDimensions) -> Self {
        let product_key = dims.product.resolve(line.get("ProductID"));
        let standard_cost = product_key.and_then(|k| dims.product.attribute(k));
        let order_date = line.get("OrderDate");

        LineHeader {
            sales_order_id: line.int("SalesOrderID"),
            sales_order_detail_id: line.int("SalesOrderDetailID"),
            product_key,
            date_key: dims.date.resolve(order_date),
            territory_key: dims.territory.resolve(line.get("TerritoryID")),
            order_date: order_date.as_date(),
            measures: SalesMeasures::from_line(line, standard_cost),
        }
    }

    fn measure_fields(m: SalesMeasures) -> [(&'static str, Value); 9] {
        [
            ("order_quantity", m.order_quantity.into()),
            ("unit_price", m.unit_price.into()),
            ("unit_price_discount", m.unit_price_discount.into()),
            ("line_total", m.line_total.into()),
            ("discount_amount", m.discount_amount.into()),
            ("net_sales_amount", m.net_sales_amount.into()),
            ("profit", m.profit.into()),
            ("tax_amount", m.tax_amount.into()),
            ("freight_amount", m.freight_amount.into()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InternetSalesRow {
    pub sales_order_id: Option<i64>,
    pub sales_order_detail_id: Option<i64>,
    pub customer_key: Option<i64>,
    pub product_key: Option<i64>,
    pub date_key: Option<i64>,
    pub territory_key: Option<i64>,
    pub order_date: Option<NaiveDate>,
    pub measures: SalesMeasures,
    pub saved_date: NaiveDate,
}

impl InternetSalesRow {
    pub fn resolve(line: &RawRecord<'_>, dims: &FactDimensions, today: NaiveDate) -> Self {
        let header = LineHeader::resolve(line, dims);
        InternetSalesRow {
            sales_order_id: header.sales_order_id,
            sales_order_detail_id: header.sales_order_detail_id,
            customer_key: dims.customer.resolve(line.get("CustomerID")),
            product_key: header.product_key,
            date_key: header.date_key,
            territory_key: header.territory_key,
            order_date: header.order_date,
            measures: header.measures,
            saved_date: today,
        }
    }
}

impl Conformed for InternetSalesRow {
    fn into_fields(self) -> Vec<(&'static str, Value)> {
        let mut fields = vec![
            ("sales_order_id", self.sales_order_id.into()),
            ("sales_order_detail_id", self.sales_order_detail_id.into()),
            ("customer_key", self.customer_key.into()),
            ("product_key", self.product_key.into()),
            ("date_key", self.date_key.into()),
            ("territory_key", self.territory_key.into()),
            ("order_date", self.order_date.into()),
        ];
        fields.extend(LineHeader::measure_fields(self.measures));
        fields.push(("saved_date", self.saved_date.into()));
        fields
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResellerSalesRow {
    pub sales_order_id: Option<i64>,
    pub sales_order_detail_id: Option<i64>,
    pub reseller_key: Option<i64>,
    pub employee_key: Option<i64>,
    pub product_key: Option<i64>,
    pub date_key: Option<i64>,
    pub territory_key: Option<i64>,
    pub order_date: Option<NaiveDate>,
    pub measures: SalesMeasures,
    pub saved_date: NaiveDate,
}

impl ResellerSalesRow {
    pub fn resolve(line: &RawRecord<'_>, dims: &FactDimensions, today: NaiveDate) -> Self {
        let header = LineHeader::resolve(line, dims);
        ResellerSalesRow {
            sales_order_id: header.sales_order_id,
            sales_order_detail_id: header.sales_order_detail_id,
            reseller_key: dims.reseller.resolve(line.get("StoreID")),
            employee_key: dims.employee.resolve(line.get("SalesPersonID")),
            product_key: header.product_key,
            date_key: header.date_key,
            territory_key: header.territory_key,
            order_date: header.order_date,
            measures: header.measures,
            saved_date: today,
        }
    }
}

impl Conformed for ResellerSalesRow {
    fn into_fields(self) -> Vec<(&'static str, Value)> {
        let mut fields = vec![
            ("sales_order_id", self.sales_order_id.into()),
            ("sales_order_detail_id", self.sales_order_detail_id.into()),
            ("reseller_key", self.reseller_key.into()),
            ("employee_key", self.employee_key.into()),
            ("product_key", self.product_key.into()),
            ("date_key", self.date_key.into()),
            ("territory_key", self.territory_key.into()),
            ("order_date", self.order_date.into()),
        ];
        fields.extend(LineHeader::measure_fields(self.measures));
        fields.push(("saved_date", self.saved_date.into()));
        fields
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dims() -> FactDimensions {
        let customers = Table::with_rows(
            &["customer_key", "customer_id"],
            vec![vec![Value::Int(1), Value::Int(11000)]],
        );
        let products = Table::with_rows(
            &["product_key", "product_id", "standard_cost"],
            vec![vec![Value::Int(7), Value::Int(771), Value::Float(4.0)]],
        );
        let dates = Table::with_rows(
            &["date_key", "full_date"],
            vec![vec![Value::Int(100), Value::Date(day(2013, 7, 4))]],
        );
        FactDimensions {
            customer: DimensionLookup::from_table(&catalog::DIM_CUSTOMER, &customers).unwrap(),
            product: DimensionLookup::with_attribute(
                &catalog::DIM_PRODUCT,
                &products,
                "standard_cost",
            )
            .unwrap(),
            date: DimensionLookup::from_table(&catalog::DIM_DATE, &dates).unwrap(),
            ..FactDimensions::default()
        }
    }

    fn internet_lines(product_id: i64) -> Table {
        let mut columns = FactKind::InternetSales.required_columns();
        columns.sort_unstable();
        let row: Vec<Value> = columns
            .iter()
            .map(|c| match *c {
                "SalesOrderID" => Value::Int(43697),
                "SalesOrderDetailID" => Value::Int(1),
                "OrderDate" => Value::Timestamp(day(2013, 7, 4).and_hms_opt(0, 0, 0).unwrap()),
                "CustomerID" => Value::Int(11000),
                "TerritoryID" => Value::Int(6),
                "ProductID" => Value::Int(product_id),
                "OrderQty" => Value::Int(2),
                "UnitPrice" => Value::Float(10.0),
                "UnitPriceDiscount" => Value::Float(0.1),
                "LineTotal" => Value::Float(20.0),
                "TaxAmt" => Value::Float(1.6),
                "Freight" => Value::Float(0.5),
                _ => Value::Null,
            })
            .collect();
        Table::with_rows(&columns, vec![row])
    }

    #[test]
    fn test_internet_fact_resolves_keys_and_measures() {
        let table = FactKind::InternetSales
            .build(&internet_lines(771), &dims(), day(2024, 1, 1))
            .unwrap();
        assert_eq!(table.len(), 1);

        let row = table.records().next().unwrap();
        assert_eq!(row.int("customer_key"), Some(1));
        assert_eq!(row.int("product_key"), Some(7));
        assert_eq!(row.int("date_key"), Some(100));
        // No territory dimension loaded
        assert!(row.get("territory_key").is_null());
        assert_eq!(row.float("discount_amount"), Some(2.0));
        assert_eq!(row.float("net_sales_amount"), Some(18.0));
        assert_eq!(row.float("profit"), Some(18.0 - 2.0 * 4.0));
        assert_eq!(row.get("order_date").as_date(), Some(day(2013, 7, 4)));
    }

    #[test]
    fn test_unresolved_product_keeps_row() {
        let table = FactKind::InternetSales
            .build(&internet_lines(999), &dims(), day(2024, 1, 1))
            .unwrap();
        assert_eq!(table.len(), 1);

        let row = table.records().next().unwrap();
        assert!(row.get("product_key").is_null());
        assert!(row.get("profit").is_null());
        assert_eq!(row.int("customer_key"), Some(1));
    }

    #[test]
    fn test_reseller_lines_need_store_and_salesperson() {
        let err = FactKind::ResellerSales
            .build(&internet_lines(771), &dims(), day(2024, 1, 1))
            .err();
        assert!(matches!(
            err,
            Some(DomainError::MissingColumn { ref column, .. }) if column == "StoreID"
        ));
    }
}

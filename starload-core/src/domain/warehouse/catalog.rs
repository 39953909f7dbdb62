// starload-core/src/domain/warehouse/catalog.rs
//
// Declared layout of every warehouse table. DDL, writers and the validator
// all read from here; nothing infers roles from column names.

use super::schema::ColumnRole::{Attribute, Audit, ForeignKey, Measure, NaturalKey, SurrogateKey};
use super::schema::SqlType::{BigInt, Boolean, Date, Double, Integer, Timestamp, Varchar};
use super::schema::{ColumnDef, TableKind, TableSchema};

const fn col(
    name: &'static str,
    sql_type: super::schema::SqlType,
    role: super::schema::ColumnRole,
) -> ColumnDef {
    ColumnDef::new(name, sql_type, role)
}

const SAVED_DATE: ColumnDef = col("saved_date", Date, Audit);

pub static DIM_CUSTOMER: TableSchema = TableSchema {
    name: "dim_customer",
    kind: TableKind::Dimension,
    natural_key: &["customer_id"],
    columns: &[
        col("customer_key", BigInt, SurrogateKey),
        col("customer_id", BigInt, NaturalKey),
        col("person_id", BigInt, Attribute),
        col("store_id", BigInt, Attribute),
        col("customer_name", Varchar, Attribute),
        col("email", Varchar, Attribute),
        col("phone", Varchar, Attribute),
        col("city", Varchar, Attribute),
        col("state_province", Varchar, Attribute),
        col("country_region", Varchar, Attribute),
        col("customer_type", Varchar, Attribute),
        col("email_promotion_tier", Varchar, Attribute),
        SAVED_DATE,
    ],
};

pub static DIM_PRODUCT: TableSchema = TableSchema {
    name: "dim_product",
    kind: TableKind::Dimension,
    natural_key: &["product_id"],
    columns: &[
        col("product_key", BigInt, SurrogateKey),
        col("product_id", BigInt, NaturalKey),
        col("product_name", Varchar, Attribute),
        col("product_number", Varchar, Attribute),
        col("color", Varchar, Attribute),
        col("size", Varchar, Attribute),
        col("weight", Double, Attribute),
        col("standard_cost", Double, Attribute),
        col("list_price", Double, Attribute),
        col("profit_margin", Double, Attribute),
        col("price_category", Varchar, Attribute),
        col("margin_category", Varchar, Attribute),
        col("category_name", Varchar, Attribute),
        col("subcategory_name", Varchar, Attribute),
        col("full_category", Varchar, Attribute),
        col("product_model_name", Varchar, Attribute),
        SAVED_DATE,
    ],
};

pub static DIM_DATE: TableSchema = TableSchema {
    name: "dim_date",
    kind: TableKind::Dimension,
    natural_key: &["full_date"],
    columns: &[
        col("date_key", BigInt, SurrogateKey),
        col("full_date", Date, NaturalKey),
        col("year", Integer, Attribute),
        col("month", Integer, Attribute),
        col("day", Integer, Attribute),
        col("weekday", Integer, Attribute),
        col("quarter", Integer, Attribute),
        col("day_of_year", Integer, Attribute),
        col("week_of_year", Integer, Attribute),
        col("month_name", Varchar, Attribute),
        col("day_name", Varchar, Attribute),
        col("is_weekend", Boolean, Attribute),
        col("is_month_end", Boolean, Attribute),
        col("is_quarter_end", Boolean, Attribute),
        col("is_year_end", Boolean, Attribute),
        col("fiscal_quarter", Integer, Attribute),
        col("fiscal_year", Integer, Attribute),
        SAVED_DATE,
    ],
};

pub static DIM_TERRITORY: TableSchema = TableSchema {
    name: "dim_territory",
    kind: TableKind::Dimension,
    natural_key: &["territory_id"],
    columns: &[
        col("territory_key", BigInt, SurrogateKey),
        col("territory_id", BigInt, NaturalKey),
        col("territory_name", Varchar, Attribute),
        col("country_region_code", Varchar, Attribute),
        col("region_group", Varchar, Attribute),
        col("sales_ytd", Double, Measure),
        col("sales_last_year", Double, Measure),
        col("cost_ytd", Double, Measure),
        col("cost_last_year", Double, Measure),
        col("ytd_profit", Double, Measure),
        col("last_year_profit", Double, Measure),
        col("sales_growth", Double, Measure),
        SAVED_DATE,
    ],
};

pub static DIM_CURRENCY: TableSchema = TableSchema {
    name: "dim_currency",
    kind: TableKind::Dimension,
    natural_key: &["currency_code"],
    columns: &[
        col("currency_key", BigInt, SurrogateKey),
        col("currency_code", Varchar, NaturalKey),
        col("currency_name", Varchar, Attribute),
        SAVED_DATE,
    ],
};

pub static DIM_EMPLOYEE: TableSchema = TableSchema {
    name: "dim_employee",
    kind: TableKind::Dimension,
    natural_key: &["business_entity_id"],
    columns: &[
        col("employee_key", BigInt, SurrogateKey),
        col("business_entity_id", BigInt, NaturalKey),
        col("employee_name", Varchar, Attribute),
        col("job_title", Varchar, Attribute),
        col("department_name", Varchar, Attribute),
        col("department_category", Varchar, Attribute),
        col("age", Integer, Attribute),
        col("years_of_service", Integer, Attribute),
        col("birth_date", Date, Attribute),
        col("hire_date", Date, Attribute),
        SAVED_DATE,
    ],
};

pub static DIM_RESELLER: TableSchema = TableSchema {
    name: "dim_reseller",
    kind: TableKind::Dimension,
    natural_key: &["store_id"],
    columns: &[
        col("reseller_key", BigInt, SurrogateKey),
        col("store_id", BigInt, NaturalKey),
        col("store_name", Varchar, Attribute),
        col("address_line", Varchar, Attribute),
        col("city", Varchar, Attribute),
        col("postal_code", Varchar, Attribute),
        col("state_province", Varchar, Attribute),
        col("country_region", Varchar, Attribute),
        col("region", Varchar, Attribute),
        SAVED_DATE,
    ],
};

pub static DIM_SALES_REASON: TableSchema = TableSchema {
    name: "dim_sales_reason",
    kind: TableKind::Dimension,
    natural_key: &["sales_reason_id", "sales_order_id"],
    columns: &[
        col("sales_reason_key", BigInt, SurrogateKey),
        col("sales_reason_id", BigInt, NaturalKey),
        col("sales_order_id", BigInt, NaturalKey),
        col("reason_name", Varchar, Attribute),
        col("reason_type", Varchar, Attribute),
        SAVED_DATE,
    ],
};

pub static FACT_INTERNET_SALES: TableSchema = TableSchema {
    name: "fact_internet_sales",
    kind: TableKind::Fact,
    natural_key: &["sales_order_id", "sales_order_detail_id"],
    columns: &[
        col("sales_order_id", BigInt, NaturalKey),
        col("sales_order_detail_id", BigInt, NaturalKey),
        col("customer_key", BigInt, ForeignKey),
        col("product_key", BigInt, ForeignKey),
        col("date_key", BigInt, ForeignKey),
        col("territory_key", BigInt, ForeignKey),
        col("order_date", Date, Attribute),
        col("order_quantity", Integer, Measure),
        col("unit_price", Double, Measure),
        col("unit_price_discount", Double, Measure),
        col("line_total", Double, Measure),
        col("discount_amount", Double, Measure),
        col("net_sales_amount", Double, Measure),
        col("profit", Double, Measure),
        col("tax_amount", Double, Measure),
        col("freight_amount", Double, Measure),
        SAVED_DATE,
    ],
};

pub static FACT_RESELLER_SALES: TableSchema = TableSchema {
    name: "fact_reseller_sales",
    kind: TableKind::Fact,
    natural_key: &["sales_order_id", "sales_order_detail_id"],
    columns: &[
        col("sales_order_id", BigInt, NaturalKey),
        col("sales_order_detail_id", BigInt, NaturalKey),
        col("reseller_key", BigInt, ForeignKey),
        col("employee_key", BigInt, ForeignKey),
        col("product_key", BigInt, ForeignKey),
        col("date_key", BigInt, ForeignKey),
        col("territory_key", BigInt, ForeignKey),
        col("order_date", Date, Attribute),
        col("order_quantity", Integer, Measure),
        col("unit_price", Double, Measure),
        col("unit_price_discount", Double, Measure),
        col("line_total", Double, Measure),
        col("discount_amount", Double, Measure),
        col("net_sales_amount", Double, Measure),
        col("profit", Double, Measure),
        col("tax_amount", Double, Measure),
        col("freight_amount", Double, Measure),
        SAVED_DATE,
    ],
};

pub static ETL_LOG: TableSchema = TableSchema {
    name: "etl_log",
    kind: TableKind::Log,
    natural_key: &[],
    columns: &[
        col("log_id", BigInt, SurrogateKey),
        col("process_name", Varchar, Attribute),
        col("run_timestamp", Timestamp, Audit),
        col("status", Varchar, Attribute),
        col("records_processed", BigInt, Measure),
        col("details", Varchar, Attribute),
    ],
};

pub static DIMENSIONS: [&TableSchema; 8] = [
    &DIM_CUSTOMER,
    &DIM_PRODUCT,
    &DIM_DATE,
    &DIM_TERRITORY,
    &DIM_CURRENCY,
    &DIM_EMPLOYEE,
    &DIM_RESELLER,
    &DIM_SALES_REASON,
];

pub static FACTS: [&TableSchema; 2] = [&FACT_INTERNET_SALES, &FACT_RESELLER_SALES];

/// Every table the bootstrap creates, dimensions first.
pub fn all_tables() -> impl Iterator<Item = &'static TableSchema> {
    DIMENSIONS
        .iter()
        .chain(FACTS.iter())
        .copied()
        .chain(std::iter::once(&ETL_LOG))
}

pub fn find(name: &str) -> Option<&'static TableSchema> {
    all_tables().find(|t| t.name.eq_ignore_ascii_case(name))
}

// starload-core/src/domain/dimension/mod.rs
//
// Conformance rules: raw source rows in, typed dimension rows out (1:1).
// Text attributes fall back to "Unspecified" before any derivation.

pub mod calendar;
pub mod customer;
pub mod employee;
pub mod product;
pub mod reference;
pub mod reseller;
pub mod territory;

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::domain::error::DomainError;
use crate::domain::table::Table;
use crate::domain::warehouse::{TableSchema, catalog};

/// Every dimension the refresh maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    Customer,
    Product,
    Date,
    Territory,
    Currency,
    Employee,
    Reseller,
    SalesReason,
}

impl DimensionKind {
    pub const ALL: [DimensionKind; 8] = [
        DimensionKind::Customer,
        DimensionKind::Product,
        DimensionKind::Date,
        DimensionKind::Territory,
        DimensionKind::Currency,
        DimensionKind::Employee,
        DimensionKind::Reseller,
        DimensionKind::SalesReason,
    ];

    pub fn entity(self) -> &'static str {
        match self {
            DimensionKind::Customer => customer::ENTITY,
            DimensionKind::Product => product::ENTITY,
            DimensionKind::Date => calendar::ENTITY,
            DimensionKind::Territory => territory::ENTITY,
            DimensionKind::Currency => reference::CURRENCY,
            DimensionKind::Employee => employee::ENTITY,
            DimensionKind::Reseller => reseller::ENTITY,
            DimensionKind::SalesReason => reference::SALES_REASON,
        }
    }

    pub fn schema(self) -> &'static TableSchema {
        match self {
            DimensionKind::Customer => &catalog::DIM_CUSTOMER,
            DimensionKind::Product => &catalog::DIM_PRODUCT,
            DimensionKind::Date => &catalog::DIM_DATE,
            DimensionKind::Territory => &catalog::DIM_TERRITORY,
            DimensionKind::Currency => &catalog::DIM_CURRENCY,
            DimensionKind::Employee => &catalog::DIM_EMPLOYEE,
            DimensionKind::Reseller => &catalog::DIM_RESELLER,
            DimensionKind::SalesReason => &catalog::DIM_SALES_REASON,
        }
    }

    /// Transforms one raw batch into a schema-ordered batch for the writer.
    /// `raw` is ignored for synthetic dimensions.
    pub fn build(self, raw: &Table, today: NaiveDate) -> Result<Table, DomainError> {
        let schema = self.schema();
        match self {
            DimensionKind::Customer => Table::from_records(schema, customer::build(raw, today)?),
            DimensionKind::Product => Table::from_records(schema, product::build(raw, today)?),
            DimensionKind::Date => Table::from_records(schema, calendar::build(today)),
            DimensionKind::Territory => {
                Table::from_records(schema, territory::build(raw, today)?)
            }
            DimensionKind::Currency => {
                Table::from_records(schema, reference::build_currencies(raw, today)?)
            }
            DimensionKind::Employee => Table::from_records(schema, employee::build(raw, today)?),
            DimensionKind::Reseller => Table::from_records(schema, reseller::build(raw, today)?),
            DimensionKind::SalesReason => {
                Table::from_records(schema, reference::build_sales_reasons(raw, today)?)
            }
        }
    }
}

impl fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.entity())
    }
}

// starload-core/src/domain/dimension/reseller.rs

use chrono::NaiveDate;

use crate::domain::error::DomainError;
use crate::domain::table::{Conformed, Table};
use crate::domain::value::Value;

pub const ENTITY: &str = "reseller";

pub const REQUIRED_COLUMNS: &[&str] = &[
    "StoreID",
    "StoreName",
    "AddressLine1",
    "City",
    "PostalCode",
    "StateProvince",
    "CountryRegion",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ResellerRow {
    pub store_id: Option<i64>,
    pub store_name: String,
    pub address_line: String,
    pub city: String,
    pub postal_code: String,
    pub state_province: String,
    pub country_region: String,
    pub region: &'static str,
    pub saved_date: NaiveDate,
}

impl Conformed for ResellerRow {
    fn into_fields(self) -> Vec<(&'static str, Value)> {
        vec![
            ("store_id", self.store_id.into()),
            ("store_name", self.store_name.into()),
            ("address_line", self.address_line.into()),
            ("city", self.city.into()),
            ("postal_code", self.postal_code.into()),
            ("state_province", self.state_province.into()),
            ("country_region", self.country_region.into()),
            ("region", self.region.into()),
            ("saved_date", self.saved_date.into()),
        ]
    }
}

/// First compass point found in the province name wins.
/// North, South, East and West are checked in that order.
pub fn region(state_province: &str) -> &'static str {
    ["North", "South", "East", "West"]
        .into_iter()
        .find(|point| state_province.contains(point))
        .unwrap_or("Central")
}

pub fn build(raw: &Table, today: NaiveDate) -> Result<Vec<ResellerRow>, DomainError> {
    raw.require_columns(ENTITY, REQUIRED_COLUMNS)?;

    Ok(raw
        .records()
        .map(|r| {
            let state_province = r.text("StateProvince");
            ResellerRow {
                store_id: r.int("StoreID"),
                store_name: r.text("StoreName"),
                address_line: r.text("AddressLine1"),
                city: r.text("City"),
                postal_code: r.text("PostalCode"),
                region: region(&state_province),
                state_province,
                country_region: r.text("CountryRegion"),
                saved_date: today,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_checks_north_first() {
        assert_eq!(region("North Carolina"), "North");
        assert_eq!(region("South Dakota"), "South");
        // Contains both; North is checked first
        assert_eq!(region("Northwest South"), "North");
        assert_eq!(region("West Virginia"), "West");
        assert_eq!(region("Ontario"), "Central");
    }
}
